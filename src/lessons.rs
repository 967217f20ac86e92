//! The GitHub lesson: read a user, then their repositories, then the commits of the
//! first repository. Also the parallel operations used to demonstrate `all` and `first`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, Participant};
use crate::config::LessonConfig;
use crate::error::OperationFailed;
use crate::events::EventBus;
use crate::pipeline::Pipeline;
use crate::unit::AsyncUnit;

pub const GET_USER: &str = "get_user";
pub const GET_REPOSITORIES: &str = "get_repositories";
pub const GET_COMMITS: &str = "get_commits";

/// Failure message of a parallel operation configured to fail.
pub const OPERATION_FAILURE: &str = "Because something failed.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id: u32,
  pub github_username: String,
}

/// Builds a lesson unit that rejects with `failure` when `config` names it.
fn lesson_unit<I, O, F>(
  name: &str,
  latency: Duration,
  failure: &'static str,
  config: &LessonConfig,
  bus: Option<&EventBus>,
  outcome: F,
) -> AsyncUnit<I, O>
where
  I: Send + 'static,
  O: Send + 'static,
  F: Fn(I) -> Result<O, OperationFailed> + Send + Sync + 'static,
{
  let unit = if config.fails(name) {
    AsyncUnit::rejected(name, failure).with_latency(latency)
  } else {
    AsyncUnit::new(name, latency, outcome)
  };
  match bus {
    Some(bus) => unit.with_events(bus.clone()),
    None => unit,
  }
}

/// Reads a user by id.
pub fn get_user(config: &LessonConfig, bus: Option<&EventBus>) -> AsyncUnit<u32, User> {
  lesson_unit(
    GET_USER,
    config.latency,
    "Could not get user.",
    config,
    bus,
    |id: u32| {
      Ok(User {
        id,
        github_username: "cooper".to_string(),
      })
    },
  )
}

/// Lists the repositories of a GitHub username.
pub fn get_repositories(
  config: &LessonConfig,
  bus: Option<&EventBus>,
) -> AsyncUnit<String, Vec<String>> {
  lesson_unit(
    GET_REPOSITORIES,
    config.latency,
    "Could not get repos.",
    config,
    bus,
    |_username: String| Ok(vec!["repo1".into(), "repo2".into(), "repo3".into()]),
  )
}

/// Lists the commits of a repository.
pub fn get_commits(config: &LessonConfig, bus: Option<&EventBus>) -> AsyncUnit<String, Vec<String>> {
  lesson_unit(
    GET_COMMITS,
    config.latency,
    "Could not get commits.",
    config,
    bus,
    |repo: String| {
      if repo.is_empty() {
        return Err(OperationFailed::new("no repository to read commits from"));
      }
      Ok(vec!["commit1".into(), "commit2".into(), "commit3".into()])
    },
  )
}

/// user id -> user -> repositories -> commits of the first repository.
pub fn commits_pipeline(config: &LessonConfig, bus: Option<&EventBus>) -> Pipeline<u32, Vec<String>> {
  Pipeline::new()
    .then(get_user(config, bus))
    .then_with(|user: User| user.github_username, get_repositories(config, bus))
    .then_with(
      |repos: Vec<String>| repos.into_iter().next().unwrap_or_default(),
      get_commits(config, bus),
    )
}

fn operation(
  number: u32,
  latency: Duration,
  config: &LessonConfig,
  bus: Option<&EventBus>,
) -> Participant<u32> {
  let name = format!("async_operation_{}", number);
  let unit = lesson_unit(&name, latency, OPERATION_FAILURE, config, bus, move |()| {
    Ok(number)
  });
  Participant::new(&unit, ())
}

/// Operations 1 and 2: the second takes three times as long as the first.
pub fn parallel_operations(config: &LessonConfig, bus: Option<&EventBus>) -> Aggregator<u32> {
  Aggregator::new()
    .participant(operation(1, config.latency, config, bus))
    .participant(operation(2, config.latency * 3, config, bus))
}

/// Operations 5 and 6: the second settles in half the time of the first.
pub fn race_operations(config: &LessonConfig, bus: Option<&EventBus>) -> Aggregator<u32> {
  Aggregator::new()
    .participant(operation(5, config.latency, config, bus))
    .participant(operation(6, config.latency / 2, config, bus))
}
