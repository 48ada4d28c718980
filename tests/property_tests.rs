//! Property tests for requirement resolution.
//!
//! A composed handler must accept a request exactly when the OR-of-ANDs
//! reading of the operation's security accepts it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use authn_resolver::web::RequestContext;
use authn_resolver::{
    AuthenticationHandler, AuthnFailure, AuthnResult, Operation, Principal, RegistrationSet,
    ResolverConfig, Route, SchemeHandler, SecurityRequirement, SecurityRequirementResolver,
};
use proptest::prelude::*;

const SCHEMES: [&str; 4] = ["api_key", "basic", "oauth", "session"];

struct Verdict {
    name: &'static str,
    pass: bool,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AuthenticationHandler for Verdict {
    async fn authenticate(&self, _ctx: &RequestContext) -> AuthnResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.pass {
            Ok(Some(Principal::new(self.name, self.name)))
        } else {
            Err(AuthnFailure::unauthenticated(format!("{} rejected", self.name)))
        }
    }
}

// Strategy: one alternative, a (possibly empty) set of scheme names
fn arb_alternative() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(SCHEMES.to_vec(), 0..=SCHEMES.len())
}

// Strategy: which registered schemes accept the request
fn arb_verdicts() -> impl Strategy<Value = BTreeMap<&'static str, bool>> {
    prop::collection::vec(any::<bool>(), SCHEMES.len())
        .prop_map(|v| SCHEMES.iter().copied().zip(v).collect())
}

fn requirement(names: &[&'static str]) -> SecurityRequirement {
    names
        .iter()
        .fold(SecurityRequirement::new(), |r, n| r.with(*n, Vec::<String>::new()))
}

fn expected(alternatives: &[Vec<&'static str>], verdicts: &BTreeMap<&'static str, bool>) -> bool {
    alternatives.is_empty()
        || alternatives
            .iter()
            .any(|alt| alt.iter().all(|name| verdicts[name]))
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn resolve(
    alternatives: &[Vec<&'static str>],
    verdicts: &BTreeMap<&'static str, bool>,
) -> (Route, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut set = RegistrationSet::new();
    for (name, pass) in verdicts {
        let handler = Verdict {
            name: *name,
            pass: *pass,
            calls: calls.clone(),
        };
        set.register(*name, SchemeHandler::new(Arc::new(handler)), None)
            .unwrap();
    }

    let resolver = SecurityRequirementResolver::new(set.build(), ResolverConfig::default());
    let operation = Operation::new("GET", "/resource")
        .with_security(alternatives.iter().map(|a| requirement(a)).collect());

    let mut route = Route::new("GET", "/resource");
    resolver.solve(&operation, &mut route).unwrap();
    (route, calls)
}

proptest! {
    /// Property: the composed handler agrees with the boolean reading
    #[test]
    fn proptest_composite_matches_or_of_ands(
        alternatives in prop::collection::vec(arb_alternative(), 0..5),
        verdicts in arb_verdicts()
    ) {
        let (route, _) = resolve(&alternatives, &verdicts);
        let ctx = RequestContext::new("req-prop", "GET", "/resource");

        let outcome = block_on(route.authenticate(&ctx));

        prop_assert_eq!(outcome.is_ok(), expected(&alternatives, &verdicts));
    }

    /// Property: any empty alternative makes the route optional
    #[test]
    fn proptest_empty_alternative_is_optional(
        mut alternatives in prop::collection::vec(arb_alternative(), 0..4),
        position in 0usize..4
    ) {
        let position = position.min(alternatives.len());
        alternatives.insert(position, Vec::new());

        let verdicts = SCHEMES.iter().map(|s| (*s, false)).collect();
        let (route, _) = resolve(&alternatives, &verdicts);

        if let Some(handler) = route.authentication() {
            prop_assert!(handler.is_optional());
        }
        let ctx = RequestContext::new("req-prop", "GET", "/resource");
        prop_assert!(block_on(route.authenticate(&ctx)).is_ok());
    }

    /// Property: evaluation never runs more handlers than were resolved
    #[test]
    fn proptest_evaluation_is_bounded(
        alternatives in prop::collection::vec(arb_alternative(), 1..5),
        verdicts in arb_verdicts()
    ) {
        let (route, calls) = resolve(&alternatives, &verdicts);
        let ctx = RequestContext::new("req-prop", "GET", "/resource");

        block_on(route.authenticate(&ctx)).ok();

        let resolved: usize = alternatives.iter().map(Vec::len).sum();
        prop_assert!(calls.load(Ordering::SeqCst) <= resolved);
    }
}
