//! Core data structures and the splitting algorithm for objcrack
//!
//! Some DCC exporters write several named objects into one Wavefront OBJ file,
//! announcing each with a `# o <name>` (or `# object <name>`) comment. This
//! crate splits such a document back into one standalone OBJ per object and
//! renumbers face indices so each output only references its own vertices.
//!
//! Everything here works on in-memory lines; reading and writing files lives in
//! `objcrack-io`.
//!
//! ```
//! use objcrack_core::split_text;
//!
//! let text = "# o A\ng A\nv 0 0 0\n#\n# o B\ng B\nv 1 1 1\nf 2 2 2\n";
//! let objects = split_text(text).unwrap();
//! assert_eq!(objects.names(), vec!["A", "B"]);
//! assert_eq!(objects.get("B").unwrap().lines.last().unwrap(), "f 1 1 1");
//! ```

pub mod document;
pub mod segment;
pub mod face;
pub mod split;
pub mod error;

pub use document::*;
pub use segment::*;
pub use face::*;
pub use split::*;
pub use error::*;
