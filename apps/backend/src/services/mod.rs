pub mod ads;
pub mod favorites;
pub mod sellers;
pub mod users;
