
mod support;

mod test_backstop;
mod test_store_failures;
