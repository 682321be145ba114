mod extractors;
mod login;
