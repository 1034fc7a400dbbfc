pub mod report;
pub mod results;
pub mod scan;
pub mod status;
