/// Revenue lag aggregation and testing.
///
/// Submodules:
/// - `groupings`       - mean lag per time-of-day bucket, fare class or route.
/// - `goodness_of_fit` - chi-square test of group means against one constant.

pub mod goodness_of_fit;
pub mod groupings;
