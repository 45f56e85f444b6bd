//! Immutable AST visitor infrastructure.
//!
//! Implementors override the `visit_*` hooks they care about and call the
//! matching `walk_*` function to keep descending. Returning
//! `ControlFlow::Break` stops the traversal early.

use std::ops::ControlFlow;

use smol_str::SmolStr;

use crate::ast::apply::{
    Aggregate, Alias, AliasExpr, Transformation, TransformationArg, TransformationKind,
};
use crate::ast::expression::{Expr, FunctionCall, Lambda, Literal, Property};
use crate::ast::query::{ExpandItem, KeyPredicate, OrderByItem, PathSegment, QueryOptions};

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

pub trait Visit {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_query_options(&mut self, options: &QueryOptions) -> VisitResult<Self::Break> {
        walk_query_options(self, options)
    }

    fn visit_path_segment(&mut self, segment: &PathSegment) -> VisitResult<Self::Break> {
        walk_path_segment(self, segment)
    }

    fn visit_select_item(&mut self, _item: &SmolStr) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_expand_item(&mut self, item: &ExpandItem) -> VisitResult<Self::Break> {
        walk_expand_item(self, item)
    }

    fn visit_order_by_item(&mut self, _item: &OrderByItem) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_transformation(&mut self, stage: &Transformation) -> VisitResult<Self::Break> {
        walk_transformation(self, stage)
    }

    fn visit_alias(&mut self, alias: &Alias) -> VisitResult<Self::Break> {
        walk_alias(self, alias)
    }

    fn visit_aggregate(&mut self, aggregate: &Aggregate) -> VisitResult<Self::Break> {
        self.visit_property(&aggregate.property)
    }

    fn visit_expr(&mut self, expr: &Expr) -> VisitResult<Self::Break> {
        walk_expr(self, expr)
    }

    fn visit_function_call(&mut self, call: &FunctionCall) -> VisitResult<Self::Break> {
        walk_function_call(self, call)
    }

    fn visit_lambda(&mut self, lambda: &Lambda) -> VisitResult<Self::Break> {
        walk_lambda(self, lambda)
    }

    fn visit_property(&mut self, _property: &Property) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_literal(&mut self, _literal: &Literal) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

pub fn walk_query_options<V: Visit + ?Sized>(
    visitor: &mut V,
    options: &QueryOptions,
) -> VisitResult<V::Break> {
    for segment in options.path.iter().flatten() {
        try_visit!(visitor.visit_path_segment(segment));
    }
    for item in options.select.iter().flatten() {
        try_visit!(visitor.visit_select_item(item));
    }
    for item in options.expand.iter().flatten() {
        try_visit!(visitor.visit_expand_item(item));
    }
    if let Some(filter) = &options.filter {
        try_visit!(visitor.visit_expr(filter));
    }
    for item in options.orderby.iter().flatten() {
        try_visit!(visitor.visit_order_by_item(item));
    }
    for stage in options.apply.iter().flatten() {
        try_visit!(visitor.visit_transformation(stage));
    }
    ControlFlow::Continue(())
}

pub fn walk_path_segment<V: Visit + ?Sized>(
    visitor: &mut V,
    segment: &PathSegment,
) -> VisitResult<V::Break> {
    for predicate in segment.predicates.iter().flatten() {
        let (KeyPredicate::Positional(value) | KeyPredicate::Named { value, .. }) = predicate;
        try_visit!(visitor.visit_literal(value));
    }
    ControlFlow::Continue(())
}

pub fn walk_expand_item<V: Visit + ?Sized>(
    visitor: &mut V,
    item: &ExpandItem,
) -> VisitResult<V::Break> {
    visitor.visit_query_options(&item.options)
}

pub fn walk_transformation<V: Visit + ?Sized>(
    visitor: &mut V,
    stage: &Transformation,
) -> VisitResult<V::Break> {
    for arg in &stage.args {
        try_visit!(walk_transformation_arg(visitor, arg));
    }
    ControlFlow::Continue(())
}

pub fn walk_transformation_arg<V: Visit + ?Sized>(
    visitor: &mut V,
    arg: &TransformationArg,
) -> VisitResult<V::Break> {
    match arg {
        TransformationArg::Expr(expr) => visitor.visit_expr(expr),
        TransformationArg::Alias(alias) => visitor.visit_alias(alias),
        TransformationArg::Transformation(stage) => visitor.visit_transformation(stage),
    }
}

pub fn walk_alias<V: Visit + ?Sized>(visitor: &mut V, alias: &Alias) -> VisitResult<V::Break> {
    match &alias.expression {
        AliasExpr::Expr(expr) => visitor.visit_expr(expr),
        AliasExpr::Aggregate(aggregate) => visitor.visit_aggregate(aggregate),
    }
}

pub fn walk_expr<V: Visit + ?Sized>(visitor: &mut V, expr: &Expr) -> VisitResult<V::Break> {
    match expr {
        Expr::Property(property) => visitor.visit_property(property),
        Expr::Literal(literal) => visitor.visit_literal(literal),
        Expr::Now(_) => ControlFlow::Continue(()),
        Expr::Cast(cast) => visitor.visit_literal(&cast.value),
        Expr::FunctionCall(call) => visitor.visit_function_call(call),
        Expr::Lambda(lambda) => visitor.visit_lambda(lambda),
        Expr::Math(_, left, right)
        | Expr::Comparison(_, left, right)
        | Expr::Logical(_, left, right) => {
            try_visit!(visitor.visit_expr(left));
            visitor.visit_expr(right)
        }
    }
}

pub fn walk_function_call<V: Visit + ?Sized>(
    visitor: &mut V,
    call: &FunctionCall,
) -> VisitResult<V::Break> {
    for arg in &call.args {
        try_visit!(visitor.visit_expr(arg));
    }
    ControlFlow::Continue(())
}

pub fn walk_lambda<V: Visit + ?Sized>(visitor: &mut V, lambda: &Lambda) -> VisitResult<V::Break> {
    visitor.visit_expr(&lambda.body)
}

/// Collects every property path a query references, in first-seen order.
///
/// Named key predicates in the resource path (`CustomerID` in
/// `Customers(CustomerID=1)`) count as references. Paths are made absolute:
/// lambda variables are replaced by the collection
/// they range over, and paths inside `$expand` options or `expand()` stages
/// are prefixed with the expanded navigation path. `*` selections are skipped.
pub fn collect_property_paths(options: &QueryOptions) -> Vec<SmolStr> {
    let mut collector = PropertyPathCollector::default();
    match collector.visit_query_options(options) {
        ControlFlow::Continue(()) => collector.paths,
        ControlFlow::Break(never) => match never {},
    }
}

#[derive(Default)]
struct PropertyPathCollector {
    paths: Vec<SmolStr>,
    /// Lambda variable to the absolute collection path it ranges over.
    scopes: Vec<(SmolStr, SmolStr)>,
    /// Absolute navigation paths of the enclosing expands.
    prefixes: Vec<SmolStr>,
}

impl PropertyPathCollector {
    fn resolve(&self, name: &str) -> SmolStr {
        let (head, rest) = match name.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        if let Some((_, target)) = self.scopes.iter().rev().find(|(var, _)| var == head) {
            return match rest {
                Some(rest) => SmolStr::from(format!("{target}/{rest}")),
                None => target.clone(),
            };
        }
        match self.prefixes.last() {
            Some(prefix) => SmolStr::from(format!("{prefix}/{name}")),
            None => SmolStr::from(name),
        }
    }

    fn record(&mut self, name: &str) -> SmolStr {
        let resolved = self.resolve(name);
        if !self.paths.contains(&resolved) {
            self.paths.push(resolved.clone());
        }
        resolved
    }
}

impl Visit for PropertyPathCollector {
    type Break = std::convert::Infallible;

    fn visit_path_segment(&mut self, segment: &PathSegment) -> VisitResult<Self::Break> {
        for predicate in segment.predicates.iter().flatten() {
            if let KeyPredicate::Named { name, .. } = predicate {
                self.record(name);
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_select_item(&mut self, item: &SmolStr) -> VisitResult<Self::Break> {
        if !item.contains('*') {
            self.record(item);
        }
        ControlFlow::Continue(())
    }

    fn visit_expand_item(&mut self, item: &ExpandItem) -> VisitResult<Self::Break> {
        let prefix = self.record(&item.path);
        self.prefixes.push(prefix);
        let flow = walk_expand_item(self, item);
        self.prefixes.pop();
        flow
    }

    fn visit_order_by_item(&mut self, item: &OrderByItem) -> VisitResult<Self::Break> {
        self.record(&item.path);
        ControlFlow::Continue(())
    }

    fn visit_transformation(&mut self, stage: &Transformation) -> VisitResult<Self::Break> {
        if stage.kind != TransformationKind::Expand {
            return walk_transformation(self, stage);
        }
        let Some((TransformationArg::Expr(Expr::Property(target)), nested)) =
            stage.args.split_first()
        else {
            return walk_transformation(self, stage);
        };
        let prefix = self.record(&target.name);
        self.prefixes.push(prefix);
        for arg in nested {
            try_visit!(walk_transformation_arg(self, arg));
        }
        self.prefixes.pop();
        ControlFlow::Continue(())
    }

    fn visit_function_call(&mut self, call: &FunctionCall) -> VisitResult<Self::Break> {
        if let [Expr::Property(collection), Expr::Lambda(lambda)] = call.args.as_slice() {
            let target = self.record(&collection.name);
            self.scopes.push((lambda.variable.clone(), target));
            let flow = walk_lambda(self, lambda);
            self.scopes.pop();
            return flow;
        }
        walk_function_call(self, call)
    }

    fn visit_property(&mut self, property: &Property) -> VisitResult<Self::Break> {
        self.record(&property.name);
        ControlFlow::Continue(())
    }
}
