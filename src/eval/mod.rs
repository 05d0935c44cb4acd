// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Program evaluation: scoped name resolution and shape tree construction.
//!
//! Evaluation walks the statement list in order, threading a [`Scope`]
//! whose parent chain reaches back through every enclosing block. Module
//! bodies evaluate with the *calling* scope as parent, so a module sees the
//! constants in effect at its call site.

pub mod links;

use crate::error::{Fault, Result};
use crate::parser::source::Offset;
use crate::parser::syntax::{
    ConstSyntax, ForSyntax, LinkSyntax, ModuleSyntax, ShapeSyntax, Syntax,
};
use crate::shape::{Builtin, ShapeNode};
use links::{HttpFetcher, LinkCache, LinkEntry, LinkFetcher};
use std::collections::HashMap;
use std::sync::Arc;

/// One lexical frame: local constants, local modules, and a parent link.
pub struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    constants: HashMap<String, f64>,
    modules: HashMap<String, Arc<ModuleSyntax>>,
    current_module: Option<String>,
}

impl<'a> Scope<'a> {
    fn root() -> Scope<'static> {
        Scope {
            parent: None,
            constants: HashMap::new(),
            modules: HashMap::new(),
            current_module: None,
        }
    }

    fn child(
        parent: &'a Scope<'a>,
        constants: HashMap<String, f64>,
        current_module: Option<String>,
    ) -> Self {
        Scope {
            parent: Some(parent),
            constants,
            modules: HashMap::new(),
            current_module,
        }
    }

    /// Resolve a value token: numeric literal, or constant lookup through
    /// the parent chain. `true` and `false` are reserved and cannot be
    /// shadowed.
    fn value(&self, token: &str) -> Option<f64> {
        match token.parse::<f64>() {
            Ok(number) => Some(number),
            Err(_) => self.constant(token),
        }
    }

    fn constant(&self, name: &str) -> Option<f64> {
        match name {
            "false" => Some(0.0),
            "true" => Some(1.0),
            _ => self
                .constants
                .get(name)
                .copied()
                .or_else(|| self.parent.and_then(|parent| parent.constant(name))),
        }
    }

    fn module(&self, name: &str) -> Option<Arc<ModuleSyntax>> {
        self.modules
            .get(name)
            .cloned()
            .or_else(|| self.parent.and_then(|parent| parent.module(name)))
    }
}

/// Evaluates parsed programs into shape trees.
///
/// Holds the link cache and transport; both are shared handles, so clones
/// of an evaluator (or evaluators built around the same cache) observe the
/// same fetched links.
pub struct Evaluator {
    cache: Arc<LinkCache>,
    fetcher: Arc<dyn LinkFetcher>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_fetcher(Arc::new(LinkCache::new()), Arc::new(HttpFetcher))
    }

    pub fn with_fetcher(cache: Arc<LinkCache>, fetcher: Arc<dyn LinkFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Evaluate a program into a single root node: an implicit `assemble`
    /// holding every top-level shape in order.
    pub fn evaluate(&self, syntaxes: &[Syntax]) -> Result<ShapeNode> {
        let mut scope = Scope::root();
        let shapes = self.build(syntaxes, &mut scope)?;
        log::debug!("evaluated {} top-level shapes", shapes.len());
        Ok(ShapeNode::new(
            Offset::root(),
            Builtin::Assemble,
            Vec::new(),
            shapes,
        ))
    }

    fn build(&self, syntaxes: &[Syntax], scope: &mut Scope) -> Result<Vec<ShapeNode>> {
        // Modules are visible to every statement in the block regardless of
        // declaration order, so the table is filled before execution.
        for syntax in syntaxes {
            if let Syntax::Module(module) = syntax {
                if scope.modules.contains_key(&module.name) {
                    return Err(Fault::new(
                        module.offset.clone(),
                        format!("duplicating module \"{}\"", module.name),
                    ));
                }
                scope.modules.insert(module.name.clone(), module.clone());
            }
        }

        let mut shapes = Vec::new();
        for syntax in syntaxes {
            match syntax {
                Syntax::Module(_) | Syntax::Comment(_) => {}
                Syntax::Const(node) => self.build_const(node, scope)?,
                Syntax::Shape(node) => shapes.extend(self.build_shape(node, scope)?),
                Syntax::For(node) => shapes.extend(self.build_for(node, scope)?),
                Syntax::Link(node) => self.build_link(node, scope)?,
            }
        }
        Ok(shapes)
    }

    fn resolve(&self, scope: &Scope, offset: &Offset, token: &str) -> Result<f64> {
        scope.value(token).ok_or_else(|| {
            Fault::new(offset.clone(), format!("constant \"{token}\" is undefined"))
        })
    }

    /// Constants mutate their own scope in statement order; a later
    /// statement in the same block observes the later value.
    fn build_const(&self, node: &ConstSyntax, scope: &mut Scope) -> Result<()> {
        let value = self.resolve(scope, &node.offset, &node.value)?;
        scope.constants.insert(node.name.clone(), value);
        Ok(())
    }

    fn build_shape(&self, node: &ShapeSyntax, scope: &mut Scope) -> Result<Vec<ShapeNode>> {
        let mut params = Vec::with_capacity(node.params.len());
        for token in &node.params {
            params.push(self.resolve(scope, &node.offset, token)?);
        }

        // The body always evaluates in a child of the current scope. The
        // current module name is inherited so the self-recursion guard
        // survives intervening builtin blocks.
        let current_module = scope.current_module.clone();
        let mut body_scope = Scope::child(scope, HashMap::new(), current_module);
        let children = self.build(&node.body, &mut body_scope)?;

        if let Some(builtin) = Builtin::from_name(&node.name) {
            return Ok(vec![ShapeNode::new(
                node.offset.clone(),
                builtin,
                params,
                children,
            )]);
        }

        // Module invocation. The guard catches a module invoking itself by
        // name; indirect cycles through other modules are not detected.
        if scope.current_module.as_deref() == Some(node.name.as_str()) {
            return Err(Fault::new(
                node.offset.clone(),
                format!("module \"{}\" has infinite size", node.name),
            ));
        }
        let Some(module) = scope.module(&node.name) else {
            return Err(Fault::new(
                node.offset.clone(),
                format!("module \"{}\" is undefined", node.name),
            ));
        };
        if module.params.len() != params.len() {
            return Err(Fault::new(
                module.offset.clone(),
                format!(
                    "{} parameters was expected, found {}",
                    module.params.len(),
                    params.len()
                ),
            ));
        }

        let mut constants = HashMap::new();
        for (formal, value) in module.params.iter().zip(&params) {
            constants.insert(formal.clone(), *value);
        }
        // Call-site scoping: the module body's parent is the calling scope,
        // not the defining one.
        let mut frame = Scope::child(scope, constants, Some(module.name.clone()));
        self.build(&module.body, &mut frame)
    }

    fn build_for(&self, node: &ForSyntax, scope: &mut Scope) -> Result<Vec<ShapeNode>> {
        let start = self.resolve(scope, &node.offset, &node.start)?;
        let end = self.resolve(scope, &node.offset, &node.end)?;
        let delta = self.resolve(scope, &node.offset, &node.delta)?;

        let mut shapes = Vec::new();
        let mut iterate = |value: f64, scope: &Scope| -> Result<()> {
            // Each iteration binds the loop constant in a clone of the
            // current table, shadowing any same-named outer constant for
            // that iteration only.
            let mut constants = scope.constants.clone();
            constants.insert(node.constant.clone(), value);
            let mut body_scope = Scope::child(scope, constants, scope.current_module.clone());
            shapes.extend(self.build(&node.body, &mut body_scope)?);
            Ok(())
        };

        if delta > 0.0 {
            let mut i = start;
            while i < end {
                iterate(i, scope)?;
                i += delta;
            }
        } else if delta < 0.0 {
            let mut i = start;
            while end < i {
                iterate(i, scope)?;
                i += delta;
            }
        }
        // delta == 0 runs zero iterations
        Ok(shapes)
    }

    /// Fetch, parse and evaluate the linked program once per URL, then merge
    /// its exports into the current scope. Constants overwrite silently;
    /// module name collisions are fatal.
    fn build_link(&self, node: &LinkSyntax, scope: &mut Scope) -> Result<()> {
        let entry = self.cache.resolve(node.url.as_str(), || {
            log::debug!("fetching link {}", node.url);
            let text = self
                .fetcher
                .fetch(&node.url)
                .map_err(|_| Fault::new(node.offset.clone(), "network error"))?;
            let syntaxes = crate::parser::parse(node.url.as_str(), &text)?;
            // Linked programs evaluate in their own root scope; their
            // shapes are discarded, only the name tables survive.
            let mut root = Scope::root();
            self.build(&syntaxes, &mut root)?;
            Ok(LinkEntry {
                modules: root.modules,
                constants: root.constants,
            })
        })?;

        for (name, value) in &entry.constants {
            scope.constants.insert(name.clone(), *value);
        }
        for (name, module) in &entry.modules {
            if scope.modules.contains_key(name) {
                return Err(Fault::new(
                    node.offset.clone(),
                    format!("duplicating module \"{name}\""),
                ));
            }
            scope.modules.insert(name.clone(), module.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    struct StubFetcher {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LinkFetcher for StubFetcher {
        fn fetch(&self, _url: &Url) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.body.to_owned())
        }
    }

    struct FailingFetcher;

    impl LinkFetcher for FailingFetcher {
        fn fetch(&self, _url: &Url) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn evaluate(text: &str) -> Result<ShapeNode> {
        Evaluator::new().evaluate(&parse("test", text)?)
    }

    fn evaluate_with(text: &str, fetcher: Arc<dyn LinkFetcher>) -> Result<ShapeNode> {
        let evaluator = Evaluator::with_fetcher(Arc::new(LinkCache::new()), fetcher);
        evaluator.evaluate(&parse("test", text)?)
    }

    #[test]
    fn root_is_an_assemble_of_top_level_shapes() {
        let root = evaluate("cube(1);\nsphere(2);").unwrap();
        assert_eq!(root.builtin, Builtin::Assemble);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].builtin, Builtin::Cube);
        assert_eq!(root.children[1].params, vec![2.0]);
    }

    #[test]
    fn constants_resolve_and_mutate_sequentially() {
        let root = evaluate(
            "const size = 3;\ncube(size);\nconst size = 5;\ncube(size);",
        )
        .unwrap();
        assert_eq!(root.children[0].params, vec![3.0]);
        assert_eq!(root.children[1].params, vec![5.0]);
    }

    #[test]
    fn constants_chain_through_other_constants() {
        let root = evaluate("const a = 2;\nconst b = a;\ncube(b);").unwrap();
        assert_eq!(root.children[0].params, vec![2.0]);
    }

    #[test]
    fn true_and_false_are_reserved() {
        let root = evaluate("const true = 9;\ncube(1, 1, 1, true);\ncube(false);").unwrap();
        assert_eq!(root.children[0].params[3], 1.0);
        assert_eq!(root.children[1].params[0], 0.0);
    }

    #[test]
    fn undefined_constant_faults() {
        let fault = evaluate("cube(missing);").unwrap_err();
        assert_eq!(fault.message, "constant \"missing\" is undefined");
    }

    #[test]
    fn module_invocation_binds_parameters() {
        let root = evaluate(
            "as box(size) {\n  cube(size);\n}\nbox(7);",
        )
        .unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].builtin, Builtin::Cube);
        assert_eq!(root.children[0].params, vec![7.0]);
    }

    #[test]
    fn module_may_be_invoked_before_declaration() {
        let root = evaluate("box(2);\nas box(size) {\n  cube(size);\n}").unwrap();
        assert_eq!(root.children[0].params, vec![2.0]);
    }

    #[test]
    fn module_body_sees_call_site_constants() {
        let root = evaluate(
            "as probe() {\n  cube(depth);\n}\nas outer() {\n  const depth = 4;\n  probe();\n}\nouter();",
        )
        .unwrap();
        assert_eq!(root.children[0].params, vec![4.0]);
    }

    #[test]
    fn module_arity_mismatch_faults() {
        let fault = evaluate("as box(w, h) {\n  cube(w, h);\n}\nbox(1);").unwrap_err();
        assert_eq!(fault.message, "2 parameters was expected, found 1");
    }

    #[test]
    fn undefined_module_faults() {
        let fault = evaluate("widget(1);").unwrap_err();
        assert_eq!(fault.message, "module \"widget\" is undefined");
    }

    #[test]
    fn duplicate_module_faults() {
        let fault = evaluate("as box() ;\nas box() ;").unwrap_err();
        assert_eq!(fault.message, "duplicating module \"box\"");
    }

    #[test]
    fn builtin_names_shadow_modules() {
        // A module named like a builtin is never reached
        let root = evaluate("as cube(x) {\n  sphere(x);\n}\ncube(3);").unwrap();
        assert_eq!(root.children[0].builtin, Builtin::Cube);
    }

    #[test]
    fn self_recursion_faults() {
        let fault = evaluate("as loop() {\n  loop();\n}\nloop();").unwrap_err();
        assert_eq!(fault.message, "module \"loop\" has infinite size");
    }

    #[test]
    fn recursion_guard_survives_builtin_blocks() {
        let fault = evaluate(
            "as loop() {\n  translate(1, 0, 0) {\n    loop();\n  }\n}\nloop();",
        )
        .unwrap_err();
        assert_eq!(fault.message, "module \"loop\" has infinite size");
    }

    #[test]
    fn for_counts_up_exclusive() {
        let root = evaluate("for(i, 0, 3, 1) {\n  cube(i);\n}").unwrap();
        let params: Vec<f64> = root.children.iter().map(|c| c.params[0]).collect();
        assert_eq!(params, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn for_counts_down_exclusive() {
        let root = evaluate("for(i, 3, 0, -1) {\n  cube(i);\n}").unwrap();
        let params: Vec<f64> = root.children.iter().map(|c| c.params[0]).collect();
        assert_eq!(params, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn for_with_zero_delta_runs_never() {
        let root = evaluate("for(i, 0, 10, 0) {\n  cube(1);\n}").unwrap();
        assert!(root.children.is_empty());
    }

    #[test]
    fn loop_variable_shadows_only_inside_the_loop() {
        let root = evaluate(
            "const i = 100;\nfor(i, 0, 1, 1) {\n  cube(i);\n}\ncube(i);",
        )
        .unwrap();
        assert_eq!(root.children[0].params, vec![0.0]);
        assert_eq!(root.children[1].params, vec![100.0]);
    }

    #[test]
    fn shape_bodies_evaluate_in_a_child_scope() {
        // A const inside a block does not leak out
        let fault = evaluate(
            "union {\n  const inner = 1;\n  cube(inner);\n}\ncube(inner);",
        )
        .unwrap_err();
        assert_eq!(fault.message, "constant \"inner\" is undefined");
    }

    #[test]
    fn link_imports_constants_and_modules() {
        let fetcher = Arc::new(StubFetcher::new(
            "const unit = 8;\nas brick() {\n  cube(unit);\n}",
        ));
        let root = evaluate_with(
            "link \"https://example.com/lib\";\nbrick();\ncube(unit);",
            fetcher,
        )
        .unwrap();
        assert_eq!(root.children[0].params, vec![8.0]);
        assert_eq!(root.children[1].params, vec![8.0]);
    }

    #[test]
    fn link_fetches_each_url_once() {
        let fetcher = Arc::new(StubFetcher::new("const unit = 1;"));
        let evaluator =
            Evaluator::with_fetcher(Arc::new(LinkCache::new()), fetcher.clone());
        let program = parse(
            "test",
            "link \"https://example.com/lib\";\nlink \"https://example.com/lib\";",
        )
        .unwrap();
        evaluator.evaluate(&program).unwrap();
        evaluator.evaluate(&program).unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn link_transport_failure_faults_at_the_link() {
        let fault = evaluate_with("link \"https://example.com/lib\";", Arc::new(FailingFetcher))
            .unwrap_err();
        assert_eq!(fault.message, "network error");
        assert_eq!(fault.offset.line, 1);
    }

    #[test]
    fn linked_module_colliding_with_local_faults() {
        let fetcher = Arc::new(StubFetcher::new("as box() ;"));
        let fault = evaluate_with(
            "as box() ;\nlink \"https://example.com/lib\";",
            fetcher,
        )
        .unwrap_err();
        assert_eq!(fault.message, "duplicating module \"box\"");
    }

    #[test]
    fn linked_shapes_are_discarded() {
        let fetcher = Arc::new(StubFetcher::new("cube(1);\nconst unit = 2;"));
        let root = evaluate_with("link \"https://example.com/lib\";\ncube(unit);", fetcher)
            .unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].params, vec![2.0]);
    }
}
