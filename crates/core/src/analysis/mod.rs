pub mod confidence_summary;
