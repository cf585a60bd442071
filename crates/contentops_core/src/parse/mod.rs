//! Pure format parsers for raw content input.
//!
//! # Responsibility
//! - Convert loosely structured text (CSV, frontmatter, bullets, tagged
//!   sections) into typed structures.
//!
//! # Invariants
//! - Parsers are pure and stateless.
//! - Parsers never panic on user input; failures are typed errors that the
//!   validator layer turns into issues.

pub mod bullets;
pub mod csv_table;
pub mod frontmatter;
pub mod sections;

pub use bullets::{normalize_bullets, parse_bullets, NormalizedBullets};
pub use csv_table::{parse_csv, parse_csv_line, CsvError, CsvRow, CsvTable};
pub use frontmatter::{
    parse_frontmatter_loose, parse_frontmatter_strict, Frontmatter, FrontmatterError,
    FrontmatterValue,
};
pub use sections::{parse_memo_sections, ParsedMemo};
