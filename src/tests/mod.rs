// Quarry's test infrastructure.
//
// Unit tests live next to the code they cover (#[cfg(test)] modules in
// engine/ and finders/); this module holds the shared fixtures plus the
// end-to-end pipeline properties that cut across components.


pub mod pipeline_tests; // End-to-end properties (strategy equivalence, scoping, failure isolation)
