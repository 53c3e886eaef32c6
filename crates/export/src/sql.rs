//! SQL for loading identifiers into a relational table.

use npid_core::Codec;

use crate::{check_range, ExportResult};

const TABLE_SQL: &str = "CREATE TABLE `national_patient_ids` (
  `id` int(11) NOT NULL auto_increment,
  `value` VARCHAR(8) NOT NULL,
  `decimal_id` int(11) NOT NULL DEFAULT 0,
  `location_id` int(11),
  PRIMARY KEY(id)
) ENGINE=InnoDB DEFAULT CHARSET=latin1;";

/// Statement creating the `national_patient_ids` table.
pub fn table_sql() -> &'static str {
    TABLE_SQL
}

/// One `INSERT` statement covering every sequence number from `start` to `end` inclusive.
///
/// Values are stored in display form (`'000-06V'`) next to their decimal id.
///
/// # Errors
///
/// Returns [`ExportError::InvalidRange`](crate::ExportError::InvalidRange) if `start > end`,
/// or the first generation error in the range.
pub fn ids_sql(codec: &Codec, start: u64, end: u64) -> ExportResult<String> {
    check_range(start, end)?;

    let rows = codec
        .generate_range(start..=end)
        .map(|id| id.map(|id| format!("('{}',{})", id, id.decimal_id())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!(
        "INSERT INTO national_patient_ids (value,decimal_id) VALUES {};",
        rows.join(",")
    ))
}
