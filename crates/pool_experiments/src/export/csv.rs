use crate::metrics::ExperimentResult;

pub(crate) fn export_to_csv_impl(
    results: &[ExperimentResult],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "minimum_passengers",
        "seed",
        "passes",
        "total_requests",
        "matched_requests",
        "canceled_requests",
        "pending_requests",
        "match_rate",
        "groups_committed",
        "avg_group_size",
        "avg_stops_per_group",
    ])?;

    for result in results {
        wtr.write_record([
            result.minimum_passengers.to_string(),
            result.seed.to_string(),
            result.passes.to_string(),
            result.total_requests.to_string(),
            result.matched_requests.to_string(),
            result.canceled_requests.to_string(),
            result.pending_requests.to_string(),
            format!("{:.4}", result.match_rate),
            result.groups_committed.to_string(),
            format!("{:.2}", result.avg_group_size),
            format!("{:.2}", result.avg_stops_per_group),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
