pub mod company;
pub mod posting;
