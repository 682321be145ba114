mod state_builder;
mod views;
