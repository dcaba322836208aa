use flowcheck_types::ResultRow;
use flowcheck_types::ids::RESULT_COLUMNS;
use std::io::Write;

/// Write the header and one record per row, in the fixed column order.
pub fn write_results_csv<W: Write>(writer: W, rows: &[ResultRow]) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(RESULT_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn render_results_csv(rows: &[ResultRow]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_results_csv(&mut buf, rows)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
