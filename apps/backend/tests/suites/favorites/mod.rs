mod device;
mod user;
