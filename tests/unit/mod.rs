/// Unit tests against the public library API
mod reminder_tests;
mod streak_tests;
