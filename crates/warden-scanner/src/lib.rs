//! Warden Scanner
//!
//! The file admission pipeline: content sniffing, extension/content cross-validation, size
//! policy, malware scanning through a clamd daemon, image header heuristics and hashing,
//! composed by [`ScanPipeline`].

pub mod clamd;
pub mod hasher;
pub mod image_heuristics;
pub mod pipeline;
pub mod size;
pub mod sniffer;
pub mod type_validator;

pub use clamd::{parse_scan_response, ClamdClient, MalwareScanner};
pub use hasher::{hash_file, sha256_file};
pub use image_heuristics::ImageHeuristics;
pub use pipeline::ScanPipeline;
pub use size::{SizeCheck, SizeValidator};
pub use sniffer::ContentSniffer;
pub use type_validator::{TypeRejection, TypeValidator};
