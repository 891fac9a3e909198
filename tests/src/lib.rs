//! End-to-end checks of the probe pipeline, the orchestrator, discovery and
//! the catalog, each run against in-process fake services.

#[cfg(test)]
mod support;

#[cfg(test)]
mod catalog;
#[cfg(test)]
mod discovery;
