// Licensed under the Apache-2.0 license

//! End-to-end tests: images are fabricated with `boot-imager` and pushed
//! through the `boot-verify` validation path a loader would run.

#[cfg(test)]
mod test_trailer_robustness;
