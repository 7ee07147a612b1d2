pub mod csv_read;
pub mod csv_write;
pub mod discover;
pub mod excel_read;
pub mod excel_write;

pub use csv_read::{read_csv_bytes, read_csv_file};
pub use csv_write::write_csv_file;
pub use discover::latest_file;
pub use excel_read::{read_excel_bytes, read_excel_file};
pub use excel_write::{frame_to_xlsx_buffer, write_xlsx_file};
