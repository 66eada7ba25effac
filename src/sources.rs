use anyhow::Result;

use crate::query::DataService;

/// One row of `udc sources`.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceStatus {
    pub name: String,
    pub data_type: &'static str,
    pub available: bool,
    pub record_count: usize,
}

pub fn source_statuses(service: &DataService) -> Vec<SourceStatus> {
    service
        .registry()
        .sources()
        .iter()
        .map(|s| SourceStatus {
            name: s.name().to_string(),
            data_type: s.data_type().as_str(),
            available: s.is_available(),
            record_count: s.record_count(),
        })
        .collect()
}

pub fn list_sources(service: &DataService) -> Result<()> {
    println!("{:<12} {:<12} {:<10} RECORDS", "SOURCE", "TYPE", "STATUS");
    for status in source_statuses(service) {
        let label = if status.available { "OK" } else { "MISSING" };
        println!(
            "{:<12} {:<12} {:<10} {}",
            status.name, status.data_type, label, status.record_count
        );
    }
    Ok(())
}
