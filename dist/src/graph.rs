//! Build task graph.
//!
//! The build is a small static DAG: the native build, Java packaging and
//! README conversion are independent, and the archive assembly depends on
//! all three. Requesting a task runs it together with its transitive
//! dependencies in a deterministic topological order.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A build task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskId {
    /// Build the native library with CMake.
    NativeBuild,
    /// Compile and package the Java JARs.
    JavaPackage,
    /// Convert the README to PDF.
    DocConvert,
    /// Assemble the distribution archive.
    ArchiveAssemble,
}

impl TaskId {
    /// Every task, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::NativeBuild,
        Self::JavaPackage,
        Self::DocConvert,
        Self::ArchiveAssemble,
    ];

    /// The task's kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NativeBuild => "native-build",
            Self::JavaPackage => "java-package",
            Self::DocConvert => "doc-convert",
            Self::ArchiveAssemble => "archive-assemble",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.name() == s)
            .ok_or_else(|| GraphError::UnknownName(s.to_owned()))
    }
}

/// Errors raised by graph construction and planning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No task has this name.
    #[error("unknown task `{0}`")]
    UnknownName(String),

    /// The task is not part of this build.
    #[error("task `{0}` is not part of this build")]
    NotInGraph(TaskId),

    /// The dependencies contain a cycle.
    #[error("task dependencies form a cycle through {}", join(.0))]
    Cycle(Vec<TaskId>),
}

fn join(tasks: &[TaskId]) -> String {
    tasks
        .iter()
        .map(|task| task.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A set of tasks and the dependencies between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskGraph {
    tasks: Vec<TaskId>,
    dependencies: HashMap<TaskId, BTreeSet<TaskId>>,
}

impl TaskGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard build graph.
    ///
    /// With `convert_readme` false the README conversion task is left out,
    /// along with its edge to the assembly.
    ///
    /// # Examples
    ///
    /// ```
    /// use jetbeep_dist::graph::{TaskGraph, TaskId};
    ///
    /// let graph = TaskGraph::standard(true);
    /// let order = graph.plan(TaskId::ArchiveAssemble).expect("acyclic");
    /// assert_eq!(order.last(), Some(&TaskId::ArchiveAssemble));
    /// assert_eq!(order.len(), 4);
    /// ```
    #[must_use]
    pub fn standard(convert_readme: bool) -> Self {
        let mut graph = Self::new();
        for task in TaskId::ALL {
            if task == TaskId::DocConvert && !convert_readme {
                continue;
            }
            graph.add_task(task);
        }
        for task in [TaskId::NativeBuild, TaskId::JavaPackage, TaskId::DocConvert] {
            if !graph.contains(task) {
                continue;
            }
            let wired = graph.add_dependency(TaskId::ArchiveAssemble, task);
            debug_assert!(wired.is_ok(), "archive-assemble must accept {task}: {wired:?}");
        }
        graph
    }

    /// Add a task with no dependencies. Re-adding is a no-op.
    pub fn add_task(&mut self, task: TaskId) {
        if !self.contains(task) {
            self.tasks.push(task);
            self.dependencies.insert(task, BTreeSet::new());
        }
    }

    /// Record that `task` runs after `depends_on`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotInGraph`] if either task is missing.
    pub fn add_dependency(&mut self, task: TaskId, depends_on: TaskId) -> Result<(), GraphError> {
        if !self.contains(depends_on) {
            return Err(GraphError::NotInGraph(depends_on));
        }
        self.dependencies
            .get_mut(&task)
            .ok_or(GraphError::NotInGraph(task))?
            .insert(depends_on);
        Ok(())
    }

    /// Whether `task` is part of the graph.
    #[must_use]
    pub fn contains(&self, task: TaskId) -> bool {
        self.dependencies.contains_key(&task)
    }

    /// Tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Direct dependencies of `task`, sorted.
    #[must_use]
    pub fn dependencies_of(&self, task: TaskId) -> Vec<TaskId> {
        self.dependencies
            .get(&task)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    /// `target` and everything it depends on, in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NotInGraph`] for an unknown target and
    /// [`GraphError::Cycle`] if the dependencies are cyclic.
    pub fn plan(&self, target: TaskId) -> Result<Vec<TaskId>, GraphError> {
        if !self.contains(target) {
            return Err(GraphError::NotInGraph(target));
        }

        let mut wanted = BTreeSet::new();
        let mut stack = vec![target];
        while let Some(task) = stack.pop() {
            if wanted.insert(task) {
                stack.extend(self.dependencies_of(task));
            }
        }
        self.order_subset(&wanted)
    }

    /// Every task, in execution order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Cycle`] if the dependencies are cyclic.
    pub fn order(&self) -> Result<Vec<TaskId>, GraphError> {
        let all: BTreeSet<TaskId> = self.tasks.iter().copied().collect();
        self.order_subset(&all)
    }

    /// Kahn's algorithm over `subset`; ties go to the earliest-inserted task.
    fn order_subset(&self, subset: &BTreeSet<TaskId>) -> Result<Vec<TaskId>, GraphError> {
        let mut remaining: Vec<TaskId> = self
            .tasks
            .iter()
            .copied()
            .filter(|task| subset.contains(task))
            .collect();
        let mut order = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining.iter().position(|task| {
                self.dependencies_of(*task)
                    .iter()
                    .all(|dep| !subset.contains(dep) || order.contains(dep))
            });
            match ready {
                Some(index) => order.push(remaining.remove(index)),
                None => return Err(GraphError::Cycle(remaining)),
            }
        }
        Ok(order)
    }
}
