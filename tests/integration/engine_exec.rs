use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proptest::prelude::*;

use tiniebla::binding::{Binding, Var};
use tiniebla::config::Context;
use tiniebla::context::ExecutionContext;
use tiniebla::dataset::MemoryDataset;
use tiniebla::engine::QueryEngine;
use tiniebla::error::{EngineError, Result};
use tiniebla::iter::{BindingIter, BoxBindingIter};
use tiniebla::pattern::{PatternCompiler, PatternElement, TriplePattern};
use tiniebla::plan::{PlanElement, PlanRef, StaticBindings};
use tiniebla::query::{OrderCondition, Query, ResultShape};
use tiniebla::value::Value;

fn var(name: &str) -> Var {
    Var::new(name)
}

fn pattern() -> PatternElement {
    PatternElement::Basic(vec![TriplePattern::new(
        var("s"),
        Value::from("p"),
        var("o"),
    )])
}

/// Compiler producing a fixed element regardless of the pattern.
#[derive(Debug)]
struct StubCompiler {
    element: PlanRef,
    calls: AtomicUsize,
}

impl StubCompiler {
    fn new(element: PlanRef) -> Self {
        StubCompiler {
            element,
            calls: AtomicUsize::new(0),
        }
    }

    fn rows(rows: Vec<Vec<(Var, Value)>>) -> Self {
        Self::new(Arc::new(StaticBindings::new(rows)))
    }
}

impl PatternCompiler for StubCompiler {
    fn compile(&self, _context: &Context, _pattern: &PatternElement) -> Result<PlanRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.element))
    }
}

/// Compiler rejecting every pattern with a query-level error.
#[derive(Debug)]
struct RejectingCompiler;

impl PatternCompiler for RejectingCompiler {
    fn compile(&self, _context: &Context, _pattern: &PatternElement) -> Result<PlanRef> {
        Err(EngineError::Query("unresolvable pattern term".into()))
    }
}

fn engine_with(query: Query, compiler: Arc<dyn PatternCompiler>) -> QueryEngine {
    let mut engine = QueryEngine::new(query, Context::new(), compiler);
    engine.set_dataset(Arc::new(MemoryDataset::new()));
    engine
}

fn collect(engine: &mut QueryEngine) -> Vec<Binding> {
    engine
        .execute()
        .unwrap()
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

fn int_column(bindings: &[Binding], name: &str) -> Vec<i64> {
    bindings
        .iter()
        .map(|binding| match binding.get(&var(name)) {
            Some(Value::Int(v)) => *v,
            other => panic!("unexpected value for {name}: {other:?}"),
        })
        .collect()
}

#[test]
fn full_pipeline_orders_projects_dedups_paginates() {
    // Raw stream: s values with duplicates, o carries the sort key.
    let rows = vec![
        vec![(var("s"), Value::Int(4)), (var("o"), Value::Int(40))],
        vec![(var("s"), Value::Int(1)), (var("o"), Value::Int(10))],
        vec![(var("s"), Value::Int(2)), (var("o"), Value::Int(20))],
        vec![(var("s"), Value::Int(2)), (var("o"), Value::Int(20))],
        vec![(var("s"), Value::Int(3)), (var("o"), Value::Int(30))],
        vec![(var("s"), Value::Int(5)), (var("o"), Value::Int(50))],
    ];
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_result_vars(["s"])
        .with_order(OrderCondition::asc("o"))
        .with_distinct(true)
        .with_offset(1)
        .with_limit(3);
    let mut engine = engine_with(query, Arc::new(StubCompiler::rows(rows)));

    let results = collect(&mut engine);
    // Sorted by o: s = 1,2,2,3,4,5; dedup over the projected s: 1,2,3,4,5;
    // window (offset 1, limit 3): 2,3,4.
    assert_eq!(int_column(&results, "s"), vec![2, 3, 4]);
    // Projection dropped the sort variable.
    assert!(results.iter().all(|b| b.get(&var("o")).is_none()));
}

#[test]
fn pagination_window_example() {
    let values = (1..=6).map(Value::Int).collect();
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true)
        .with_offset(2)
        .with_limit(3);
    let mut engine = engine_with(
        query,
        Arc::new(StubCompiler::new(Arc::new(StaticBindings::column("x", values)))),
    );
    assert_eq!(int_column(&collect(&mut engine), "x"), vec![3, 4, 5]);
}

#[test]
fn distinct_without_projection_keeps_first_seen_order() {
    let rows = vec![
        vec![(var("x"), Value::Int(1))],
        vec![(var("x"), Value::Int(1))],
        vec![(var("x"), Value::Int(2))],
    ];
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true)
        .with_distinct(true);
    let mut engine = engine_with(query, Arc::new(StubCompiler::rows(rows)));
    assert_eq!(int_column(&collect(&mut engine), "x"), vec![1, 2]);
}

#[test]
fn initial_solution_shows_through_pattern_results() {
    let rows = vec![vec![(var("x"), Value::Int(1))]];
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true);
    let mut engine = engine_with(query, Arc::new(StubCompiler::rows(rows)));
    engine.set_initial([(var("who"), Value::from("alice"))]);

    let results = collect(&mut engine);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get(&var("x")), Some(&Value::Int(1)));
    assert_eq!(results[0].get(&var("who")), Some(&Value::from("alice")));
}

#[test]
fn construct_shape_exposes_every_variable() {
    let rows = vec![vec![
        (var("s"), Value::Int(1)),
        (var("o"), Value::Int(2)),
    ]];
    // Result vars are declared, but construct still sees the full binding.
    let query = Query::new(ResultShape::Construct)
        .with_pattern(pattern())
        .with_result_vars(["s"]);
    let mut engine = engine_with(query, Arc::new(StubCompiler::rows(rows)));

    let results = collect(&mut engine);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].get(&var("s")), Some(&Value::Int(1)));
    assert_eq!(results[0].get(&var("o")), Some(&Value::Int(2)));
}

#[test]
fn select_all_exposes_every_variable() {
    let rows = vec![vec![
        (var("s"), Value::Int(1)),
        (var("o"), Value::Int(2)),
    ]];
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_result_vars(["s"])
        .with_select_all(true);
    let mut engine = engine_with(query, Arc::new(StubCompiler::rows(rows)));

    let results = collect(&mut engine);
    assert_eq!(results[0].get(&var("o")), Some(&Value::Int(2)));
}

#[test]
fn compiler_failure_surfaces_as_query_error() {
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true);
    let mut engine = engine_with(query, Arc::new(RejectingCompiler));
    let err = engine.execute().unwrap_err();
    assert!(matches!(err, EngineError::Query(_)));
}

// ---- close-discipline probes ----

/// Wraps another element and counts how often its iterator is closed.
#[derive(Debug)]
struct Probe {
    inner: PlanRef,
    closes: Arc<AtomicUsize>,
}

impl PlanElement for Probe {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = self.inner.build(input, ctx)?;
        Ok(Box::new(ProbeIter {
            input: upstream,
            closes: Arc::clone(&self.closes),
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "Probe"
    }

    fn input(&self) -> Option<&PlanRef> {
        Some(&self.inner)
    }
}

struct ProbeIter {
    input: BoxBindingIter,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

impl BindingIter for ProbeIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        self.input.try_next()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.input.close();
        }
    }
}

/// Element whose iterator fails after yielding one row.
#[derive(Debug)]
struct FailSecond {
    inner: PlanRef,
}

impl PlanElement for FailSecond {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let upstream = self.inner.build(input, ctx)?;
        Ok(Box::new(FailSecondIter {
            input: upstream,
            pulls: 0,
            closed: false,
        }))
    }

    fn name(&self) -> &'static str {
        "FailSecond"
    }

    fn input(&self) -> Option<&PlanRef> {
        Some(&self.inner)
    }
}

struct FailSecondIter {
    input: BoxBindingIter,
    pulls: usize,
    closed: bool,
}

impl BindingIter for FailSecondIter {
    fn try_next(&mut self) -> Result<Option<Binding>> {
        if self.closed {
            return Ok(None);
        }
        self.pulls += 1;
        if self.pulls > 1 {
            return Err(EngineError::Execution("cursor lost".into()));
        }
        self.input.try_next()
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.input.close();
        }
    }
}

/// Element whose build opens its child, then fails mid-construction.
#[derive(Debug)]
struct FailBuild {
    inner: PlanRef,
}

impl PlanElement for FailBuild {
    fn build(&self, input: BoxBindingIter, ctx: &ExecutionContext) -> Result<BoxBindingIter> {
        let mut opened = self.inner.build(input, ctx)?;
        opened.close();
        Err(EngineError::Execution("build aborted".into()))
    }

    fn name(&self) -> &'static str {
        "FailBuild"
    }

    fn input(&self) -> Option<&PlanRef> {
        Some(&self.inner)
    }
}

fn probe_element(closes: &Arc<AtomicUsize>, values: Vec<i64>) -> PlanRef {
    Arc::new(Probe {
        inner: Arc::new(StaticBindings::column(
            "x",
            values.into_iter().map(Value::Int).collect(),
        )),
        closes: Arc::clone(closes),
    })
}

#[test]
fn abandoning_a_stream_closes_the_tree_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true)
        .with_distinct(true)
        .with_order(OrderCondition::asc("x"));
    let mut engine = engine_with(
        query,
        Arc::new(StubCompiler::new(probe_element(&closes, vec![1, 2, 3]))),
    );

    let mut results = engine.execute().unwrap();
    let first = results.try_next().unwrap().unwrap();
    assert_eq!(first.get(&var("x")), Some(&Value::Int(1)));
    drop(results);

    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn explicit_close_is_idempotent() {
    let closes = Arc::new(AtomicUsize::new(0));
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true);
    let mut engine = engine_with(
        query,
        Arc::new(StubCompiler::new(probe_element(&closes, vec![1]))),
    );

    let mut results = engine.execute().unwrap();
    results.close();
    results.close();
    drop(results);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn iteration_error_closes_the_tree_and_propagates() {
    let closes = Arc::new(AtomicUsize::new(0));
    let element: PlanRef = Arc::new(FailSecond {
        inner: probe_element(&closes, vec![1, 2, 3]),
    });
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true);
    let mut engine = engine_with(query, Arc::new(StubCompiler::new(element)));

    let mut results = engine.execute().unwrap();
    assert!(results.try_next().unwrap().is_some());
    let err = results.try_next().unwrap_err();
    assert!(matches!(err, EngineError::Execution(_)));
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    // The stream is closed; further pulls are quiet.
    assert!(results.try_next().unwrap().is_none());
    drop(results);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn build_failure_closes_already_opened_iterators() {
    let closes = Arc::new(AtomicUsize::new(0));
    let element: PlanRef = Arc::new(FailBuild {
        inner: probe_element(&closes, vec![1]),
    });
    // Modifiers above the failing element propagate its build error.
    let query = Query::new(ResultShape::Rows)
        .with_pattern(pattern())
        .with_select_all(true)
        .with_distinct(true)
        .with_limit(10);
    let mut engine = engine_with(query, Arc::new(StubCompiler::new(element)));

    let err = engine.execute().unwrap_err();
    assert!(matches!(err, EngineError::Execution(_)));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

proptest! {
    #[test]
    fn pagination_matches_slice_semantics(offset in 0i64..25, limit in 0i64..25) {
        let values: Vec<i64> = (0..20).collect();
        let query = Query::new(ResultShape::Rows)
            .with_pattern(pattern())
            .with_select_all(true)
            .with_offset(offset)
            .with_limit(limit);
        let mut engine = engine_with(
            query,
            Arc::new(StubCompiler::new(Arc::new(StaticBindings::column(
                "x",
                values.iter().copied().map(Value::Int).collect(),
            )))),
        );

        let produced = int_column(&collect(&mut engine), "x");
        let expected: Vec<i64> = values
            .iter()
            .copied()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        prop_assert_eq!(produced, expected);
    }
}
