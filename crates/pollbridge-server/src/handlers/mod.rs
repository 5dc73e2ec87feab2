pub mod bridge;
pub mod xban;
