pub mod cli;
pub mod discovery;
pub mod link;
pub mod linting;
pub mod logging;
pub mod model;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod workspace;
