//! Integration tests for cpctl

mod test_poller;
