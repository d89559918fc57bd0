// Aggregates all pager integration tests as modules.
mod cancellation;
mod change_feed;
mod support;
