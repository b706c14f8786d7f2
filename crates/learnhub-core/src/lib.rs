pub mod division;
pub mod shapes;
pub mod status;
pub mod storage;
