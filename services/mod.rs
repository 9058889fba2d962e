pub mod elevation;
pub mod external_links;
