//! SQL generation and batched INSERT building for the benchmark table.

/// Name of the benchmark table inside the target database.
pub const TABLE_NAME: &str = "t";

/// Filler stored in the string column of every row.
pub const ROW_PAYLOAD: &str = "string_payload_payload_payload";

/// Flush an INSERT once its VALUES list would grow beyond this many bytes.
pub const DEFAULT_BATCH_BYTES: usize = 1_000_000;

/// Primary key of the skewed row: the largest signed 64-bit integer.
pub const SKEWED_KEY: u64 = i64::MAX as u64;

/// Generate the statement selecting the session's database.
pub fn generate_use_database(database: &str) -> String {
    format!("use `{database}`")
}

/// Generate DROP TABLE statement.
pub fn generate_drop_table(table_name: &str) -> String {
    format!("drop table if exists {table_name};")
}

/// Generate CREATE TABLE statement for the fixed four-column layout.
pub fn generate_create_table(table_name: &str) -> String {
    format!(
        "create table {table_name} (a bigint primary key auto_increment, b int, c int, d varchar(255));"
    )
}

/// Generate the TiDB region pre-split statement covering keys `[0, rows]`.
pub fn generate_split_table(table_name: &str, rows: u64, regions: u64) -> String {
    format!("split table {table_name} between (0) and ({rows}) regions {regions};")
}

/// Render one row as a VALUES tuple. Both integer columns carry `value`.
pub fn row_tuple(key: u64, value: u64) -> String {
    format!("({key}, {value}, {value}, '{ROW_PAYLOAD}')")
}

/// Wrap a comma-separated list of tuples into a multi-row INSERT.
pub fn generate_insert(table_name: &str, values: &str) -> String {
    format!("insert into {table_name} values {values};")
}

/// Generate the single-row INSERT for the skewed outlier that follows `rows`
/// sequential rows.
pub fn generate_skewed_row(table_name: &str, rows: u64) -> String {
    generate_insert(table_name, &row_tuple(SKEWED_KEY, rows + 1))
}

/// Accumulates row tuples into multi-row INSERT statements bounded by size.
///
/// The VALUES list of a statement produced by [`InsertBatcher::push`] never
/// exceeds `max_bytes`, unless a single tuple is larger than that on its own.
#[derive(Debug)]
pub struct InsertBatcher {
    table_name: String,
    values: String,
    max_bytes: usize,
}

impl InsertBatcher {
    pub fn new(table_name: &str, max_bytes: usize) -> Self {
        Self {
            table_name: table_name.to_string(),
            values: String::new(),
            max_bytes,
        }
    }

    /// Append a tuple. When it does not fit into the pending batch, the
    /// pending batch is returned as a statement and the tuple starts a new one.
    pub fn push(&mut self, tuple: &str) -> Option<String> {
        let flushed = if !self.values.is_empty()
            && self.values.len() + 1 + tuple.len() > self.max_bytes
        {
            Some(self.take())
        } else {
            None
        };

        if !self.values.is_empty() {
            self.values.push(',');
        }
        self.values.push_str(tuple);
        flushed
    }

    /// Return whatever is still pending as a final statement.
    pub fn finish(&mut self) -> Option<String> {
        if self.values.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    /// Bytes currently buffered in the VALUES list.
    pub fn pending_bytes(&self) -> usize {
        self.values.len()
    }

    fn take(&mut self) -> String {
        let values = std::mem::take(&mut self.values);
        generate_insert(&self.table_name, &values)
    }
}
