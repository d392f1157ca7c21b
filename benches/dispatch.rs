use criterion::{criterion_group, criterion_main, Criterion};
use fwsim::context::RequestContext;
use fwsim::dispatcher::Dispatcher;
use fwsim::router::RouteTable;
use fwsim::{response, security};
use http::Method;
use std::hint::black_box;

fn example_routes() -> RouteTable {
    let mut table = RouteTable::new();
    for path in ["/", "/status", "/pins", "/proxy", "/config", "/wifi", "/ota", "/reboot"] {
        table.register(path, Method::GET, || {});
    }
    table.register("/set", Method::POST, || {
        let pin = fwsim::context::param("pin");
        let val = fwsim::context::param("val");
        response::send(200, "text/plain", format!("pin {pin} -> {}", val == "1"));
    });
    table.register("/secure", Method::GET, || {
        if !security::authenticate("admin", "secret") {
            return security::request_authentication();
        }
        response::send(200, "text/plain", "welcome");
    });
    table
}

fn bench_route_lookup(c: &mut Criterion) {
    let table = example_routes();
    c.bench_function("route_lookup", |b| {
        let lookups = [
            (Method::GET, "/status"),
            (Method::POST, "/set"),
            (Method::GET, "/reboot"),
            (Method::GET, "/does/not/exist"),
        ];
        b.iter(|| {
            for (method, path) in &lookups {
                black_box(table.route(method, path));
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let table = example_routes();
    let dispatcher = Dispatcher::new("bench");

    let set = table.route(&Method::POST, "/set").cloned();
    let secure = table.route(&Method::GET, "/secure").cloned();
    let (Some(set), Some(secure)) = (set, secure) else {
        return;
    };

    c.bench_function("dispatch_params", |b| {
        b.iter(|| {
            let req = RequestContext::new(Method::POST, "/set?pin=5&val=1");
            black_box(dispatcher.dispatch(&set, req))
        })
    });

    c.bench_function("dispatch_basic_auth", |b| {
        b.iter(|| {
            let req = RequestContext::new(Method::GET, "/secure")
                .with_header("Authorization", "Basic YWRtaW46c2VjcmV0");
            black_box(dispatcher.dispatch(&secure, req))
        })
    });
}

criterion_group!(benches, bench_route_lookup, bench_dispatch);
criterion_main!(benches);
