// End-to-end scenario suite driving the engine with synthetic client
// snapshots, plus dispatch timing and invariant coverage.


mod test_invariants;
mod test_reconnect;
mod test_scenarios;
