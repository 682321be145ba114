mod contact;
mod create;
mod detail;
mod listing;
