// Split-read classification
//
// A usable split read aligns one contiguous run to the genome and clips the
// rest, which belongs to the inserted transposon:
// - upstream:   <match>M<clip>(S|H)
// - downstream: <clip>(S|H)<match>M

pub mod cigar;
pub mod range;

pub use cigar::{classify, CigarMode, CigarOp, SplitDirection, SplitRead};
pub use range::{is_consistent, project, SplitReadRange};
