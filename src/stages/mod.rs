pub mod bucketing;
pub mod grouping;
pub mod merge;

pub use bucketing::{bucket_artist_directories, bucket_names, BucketingReport, Placement, PlacementKind};
pub use grouping::{group_by_artist, GroupedFile, GroupingReport};
pub use merge::{merge_staging_into_archive, MergeReport};
