use indicatif::{ProgressBar, ProgressStyle};

/// Counts files rather than records, so the rate is left out.
pub fn file_progress(len: u64, message: &'static str) -> ProgressBar {
    ProgressBar::new(len)
        .with_style(
            ProgressStyle::with_template("[{elapsed_precise}] {msg} {human_pos}/{human_len} {percent}%")
                .expect("hardcoded"),
        )
        .with_message(message)
}

/// `(rows, columns)` the way a data frame prints its shape.
pub fn shape(table: &_model::Table) -> (usize, usize) {
    (table.len(), table.columns.len())
}
