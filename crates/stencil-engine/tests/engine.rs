use std::sync::Arc;
use std::time::{Duration, Instant};

use stencil_common_config::StencilConfig;
use stencil_engine::{Engine, EngineError, Params, TemplateWatcher};
use stencil_test_utils::{assert_err, assert_ok, TemplateTree};
use stencil_value::{Record, Value};

fn config(tree: &TemplateTree) -> StencilConfig {
    let mut config = StencilConfig::default();
    config.templates.root = tree.root().to_path_buf();
    config
}

fn engine(tree: &TemplateTree) -> Engine {
    assert_ok!(Engine::new(config(tree)))
}

fn params<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn extends_layout_with_declared_default() {
    let tree = TemplateTree::new()
        .file("page.tmpl", "{{extends \"layout.tmpl\"}}\n<main>{{title}}</main>\n")
        .file(
            "layout.tmpl",
            "{{var \"title\"}}\"Default\"{{end}}\n<title>{{title}}</title>\n",
        );
    let engine = engine(&tree);

    let out = assert_ok!(engine.render("page.tmpl", &Params::new()));
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "<main>Default</main>\n<title>Default</title>\n"
    );

    assert!(engine
        .descendants("page.tmpl")
        .unwrap()
        .contains(&"layout.tmpl".to_string()));
    let effective = engine.effective_params("page.tmpl", &Params::new()).unwrap();
    assert_eq!(effective["title"], Value::from("Default"));

    let out = engine
        .render_to_string("page.tmpl", &params([("title", Value::from("Home"))]))
        .unwrap();
    assert_eq!(out, "<main>Home</main>\n<title>Home</title>\n");
}

#[test]
fn child_fills_layout_slots() {
    let tree = TemplateTree::new()
        .file(
            "page.tmpl",
            "{{extends \"layout.tmpl\"}}{{#*inline \"content\"}}Body of {{title}}{{/inline}}",
        )
        .file(
            "about.tmpl",
            concat!(
                "{{extends \"layout.tmpl\"}}{{var \"title\"}}About{{end}}",
                "{{#*inline \"content\"}}Us{{/inline}}",
            ),
        )
        .file(
            "layout.tmpl",
            "{{var \"title\"}}Site{{end}}<html><h1>{{title}}</h1>{{> content}}</html>",
        );
    let engine = engine(&tree);

    assert_eq!(
        engine.render_to_string("page.tmpl", &Params::new()).unwrap(),
        "<html><h1>Site</h1>Body of Site</html>"
    );
    assert_eq!(
        engine.render_to_string("about.tmpl", &Params::new()).unwrap(),
        "<html><h1>About</h1>Us</html>"
    );
}

#[test]
fn caller_params_win_over_defaults() {
    let tree = TemplateTree::new()
        .file("a.tmpl", "{{var \"a\"}}5{{end}}{{a}}")
        .file("b.tmpl", "{{var \"b\"}}5{{end}}{{a}}{{b}}");
    let engine = engine(&tree);
    engine.parse().unwrap();

    let caller = params([("a", Value::from(1i64))]);
    assert_eq!(engine.effective_params("a.tmpl", &caller).unwrap(), caller);
    assert_eq!(
        engine.effective_params("b.tmpl", &caller).unwrap(),
        params([("a", Value::from(1i64)), ("b", Value::from(5i64))])
    );
    assert_eq!(engine.render_to_string("b.tmpl", &caller).unwrap(), "15");
}

#[test]
fn entry_defaults_win_over_inherited_ones() {
    let tree = TemplateTree::new()
        .file(
            "page.tmpl",
            concat!(
                "{{extends \"layouts/base.tmpl\"}}{{var \"title\"}}Page{{end}}",
                "{{template \"partials/footer.tmpl\"}}",
            ),
        )
        .file(
            "layouts/base.tmpl",
            "{{var \"title\"}}Base{{end}}{{var \"footer\"}}base footer{{end}}|{{title}}",
        )
        .file(
            "partials/footer.tmpl",
            "{{var \"footer\"}}partial footer{{end}}{{footer}}",
        );
    let engine = engine(&tree);

    assert_eq!(
        engine.render_to_string("page.tmpl", &Params::new()).unwrap(),
        "base footer|Page"
    );
    assert_eq!(
        engine.descendants("page.tmpl").unwrap(),
        vec!["layouts/base.tmpl", "partials/footer.tmpl"]
    );
}

#[test]
fn operations_in_templates() {
    let tree = TemplateTree::new()
        .file("list.tmpl", "{{join \", \" (add 5 items)}}")
        .file("name.tmpl", "{{upper (trim name)}} has {{len name}} chars")
        .file("tags.tmpl", "{{var \"tags\"}}[rust, go]{{end}}{{join \"/\" tags}}")
        .file("money.tmpl", "{{format_number 2 amount}}");
    let engine = engine(&tree);

    let items = Value::seq([Value::from(10i64), Value::from(20i64)]);
    assert_eq!(
        engine.render_to_string("list.tmpl", &params([("items", items)])).unwrap(),
        "15, 25"
    );
    assert_eq!(
        engine
            .render_to_string("name.tmpl", &params([("name", Value::from(" ada "))]))
            .unwrap(),
        "ADA has 5 chars"
    );
    assert_eq!(engine.render_to_string("tags.tmpl", &Params::new()).unwrap(), "rust/go");
    assert_eq!(
        engine
            .render_to_string("money.tmpl", &params([("amount", Value::from(1234567i64))]))
            .unwrap(),
        "1,234,567.00"
    );
}

#[test]
fn operations_see_json_typed_arguments() {
    let tree = TemplateTree::new()
        .file("sum.tmpl", "{{add 10 x}}")
        .file("user.tmpl", "{{len user}} {{join \",\" (keys user)}}");
    let engine = engine(&tree);

    // Widths do not survive the executor: 250u8 + 10 is computed as i64.
    let x = params([("x", Value::from(250u8))]);
    assert_eq!(engine.render_to_string("sum.tmpl", &x).unwrap(), "260");

    let user = Value::Record(
        Record::new("User")
            .with_field("name", "ada")
            .with_private_field("token", "secret"),
    );
    assert_eq!(
        engine.render_to_string("user.tmpl", &params([("user", user)])).unwrap(),
        "1 name"
    );
}

#[test]
fn template_directive_with_context_argument() {
    let tree = TemplateTree::new()
        .file("post.tmpl", "By {{template \"partials/user.tmpl\" author}}.")
        .file("partials/user.tmpl", "{{name}} <{{email}}>");
    let engine = engine(&tree);

    let author = Value::map([
        ("name", Value::from("Ada")),
        ("email", Value::from("ada@example.com")),
    ]);
    assert_eq!(
        engine.render_to_string("post.tmpl", &params([("author", author)])).unwrap(),
        "By Ada <ada@example.com>."
    );
}

#[test]
fn diagnostic_policy_decides_whether_renders_halt() {
    let tree = TemplateTree::new().file("ratio.tmpl", "{{divide 0 n}}");
    let n = params([("n", Value::from(10i64))]);

    let lenient = engine(&tree);
    assert_eq!(lenient.render_to_string("ratio.tmpl", &n).unwrap(), "10");

    let mut strict = config(&tree);
    strict.diagnostics.halt_on_error = true;
    let strict = Engine::new(strict).unwrap();
    let err = assert_err!(strict.render_to_string("ratio.tmpl", &n));
    assert!(matches!(err, EngineError::Render(_)));
    assert!(err.to_string().contains("divisible by zero"), "{err}");
}

#[test]
fn unknown_and_excluded_templates_are_not_found() {
    let tree = TemplateTree::new()
        .file("index.tmpl", "index")
        .file("layouts/base.tmpl", "base");
    let engine = engine(&tree);

    for name in ["missing.tmpl", "layouts/base.tmpl", "../index.tmpl"] {
        match engine.render(name, &Params::new()) {
            Err(EngineError::TemplateNotFound(n)) => assert_eq!(n, name),
            other => panic!("{name}: expected TemplateNotFound, got {other:?}"),
        }
    }
    assert_eq!(engine.bundle_names().unwrap(), vec!["index.tmpl"]);
}

#[test]
fn cycles_fail_compilation() {
    let tree = TemplateTree::new()
        .file("a.tmpl", "{{template \"partials/b.tmpl\"}}")
        .file("partials/b.tmpl", "{{template \"a.tmpl\"}}");
    let engine = engine(&tree);
    let err = assert_err!(engine.render("a.tmpl", &Params::new()));
    match err {
        EngineError::DependencyCycle(cycle) => {
            assert_eq!(cycle, vec!["a.tmpl", "partials/b.tmpl", "a.tmpl"]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn hot_reload_recompiles_on_every_render() {
    let tree = TemplateTree::new().file("page.tmpl", "{{var \"x\"}}one{{end}}v1 {{x}}");
    let mut config = config(&tree);
    config.templates.hot_reload = true;
    let engine = Engine::new(config).unwrap();

    assert_eq!(engine.render_to_string("page.tmpl", &Params::new()).unwrap(), "v1 one");

    tree.write("page.tmpl", "{{var \"x\"}}two{{end}}v2 {{x}}");
    // The body is reloaded; the first declaration of x is kept.
    assert_eq!(engine.render_to_string("page.tmpl", &Params::new()).unwrap(), "v2 one");
}

#[test]
fn cached_bundles_change_only_when_invalidated() {
    let tree = TemplateTree::new()
        .file("index.tmpl", "[{{template \"partials/nav.tmpl\"}}]")
        .file("about.tmpl", "about")
        .file("partials/nav.tmpl", "nav v1");
    let engine = engine(&tree);
    engine.parse().unwrap();

    tree.write("partials/nav.tmpl", "nav v2");
    assert_eq!(engine.render_to_string("index.tmpl", &Params::new()).unwrap(), "[nav v1]");

    assert_eq!(engine.invalidate("partials/nav.tmpl").unwrap(), vec!["index.tmpl"]);
    assert_eq!(engine.render_to_string("index.tmpl", &Params::new()).unwrap(), "[nav v2]");
}

#[test]
fn failed_recompile_keeps_previous_bundle() {
    let tree = TemplateTree::new().file("page.tmpl", "good");
    let engine = engine(&tree);
    engine.parse().unwrap();

    tree.write("page.tmpl", "{{#if broken}}");
    assert!(engine.invalidate("page.tmpl").unwrap().is_empty());
    assert_eq!(engine.render_to_string("page.tmpl", &Params::new()).unwrap(), "good");

    assert!(matches!(
        engine.parse_file(tree.path("page.tmpl")),
        Err(EngineError::Executor(_))
    ));
    assert_eq!(engine.render_to_string("page.tmpl", &Params::new()).unwrap(), "good");
}

#[test]
fn invalidate_tracks_created_and_deleted_entries() {
    let tree = TemplateTree::new().file("index.tmpl", "index");
    let engine = engine(&tree);
    engine.parse().unwrap();

    tree.write("new.tmpl", "new");
    assert_eq!(engine.invalidate("new.tmpl").unwrap(), vec!["new.tmpl"]);
    assert_eq!(engine.bundle_names().unwrap(), vec!["index.tmpl", "new.tmpl"]);

    tree.remove("index.tmpl");
    assert!(engine.invalidate("index.tmpl").unwrap().is_empty());
    assert_eq!(engine.bundle_names().unwrap(), vec!["new.tmpl"]);
    assert!(engine.descendants("index.tmpl").unwrap().is_empty());
    assert!(matches!(
        engine.render("index.tmpl", &Params::new()),
        Err(EngineError::TemplateNotFound(_))
    ));
}

#[test]
fn files_added_after_parse_render_on_demand() {
    let tree = TemplateTree::new().file("index.tmpl", "index");
    let engine = engine(&tree);
    engine.parse().unwrap();

    tree.write("late.tmpl", "late");
    assert_eq!(engine.render_to_string("late.tmpl", &Params::new()).unwrap(), "late");
}

#[test]
fn concurrent_renders_share_one_engine() {
    let tree = TemplateTree::new()
        .file("greet.tmpl", "{{var \"greeting\"}}Hello{{end}}{{greeting}}, {{name}}!");
    let engine = engine(&tree);

    std::thread::scope(|s| {
        for i in 0..8 {
            let engine = &engine;
            s.spawn(move || {
                let name = format!("user{i}");
                let out = engine
                    .render_to_string("greet.tmpl", &params([("name", Value::from(name.as_str()))]))
                    .unwrap();
                assert_eq!(out, format!("Hello, {name}!"));
            });
        }
    });
    assert_eq!(engine.bundle_names().unwrap(), vec!["greet.tmpl"]);
}

#[test]
fn watcher_rebuilds_dependents() {
    let tree = TemplateTree::new()
        .file("index.tmpl", "{{template \"partials/nav.tmpl\"}}")
        .file("partials/nav.tmpl", "v1");
    let engine = Arc::new(engine(&tree));
    engine.parse().unwrap();
    let watcher = TemplateWatcher::new(Arc::clone(&engine)).unwrap();

    tree.write("partials/nav.tmpl", "v2");

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut rebuilt = false;
    while Instant::now() < deadline && !rebuilt {
        if let Some(event) = watcher.next_event_timeout(Duration::from_millis(200)) {
            rebuilt = event.name == "partials/nav.tmpl"
                && event.rebuilt.contains(&"index.tmpl".to_string());
        }
    }
    assert!(rebuilt, "no rebuild event for partials/nav.tmpl");
    assert_eq!(engine.render_to_string("index.tmpl", &Params::new()).unwrap(), "v2");
}
