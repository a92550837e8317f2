//! Test-only fixture builders, grounded on the teacher's `testing::helpers`
//! builder-function style (`mock_huginn` is Huginn-specific and has no
//! counterpart in this pipeline).

pub mod helpers;

pub use helpers::*;
