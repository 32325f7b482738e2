// src/parser.rs
use swc_common::{FileName, SourceMap, sync::Lrc};
use swc_ecma_ast::*;
use swc_ecma_parser::{Parser as SwcParser, StringInput, Syntax, TsConfig, lexer::Lexer};
use swc_ecma_visit::{Visit, VisitWith};
use std::collections::HashMap;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::SourceError;
use crate::model::RouteDef;

/// AST をトラバースして vue-router のルート定義を抽出するための Visitor
struct RouteVisitor {
    /// この Visitor が解析対象としているファイル
    source_file: std::path::PathBuf,
    /// 見つかった RouteDef を格納する Vec
    pub routes: Vec<RouteDef>,
    /// default import のローカル名 → import 指定子
    imports: HashMap<String, String>,
    /// 変数名とその配列リテラルのマッピング
    route_variables: HashMap<String, Vec<ObjectLit>>,
}

impl RouteVisitor {
    fn new(source_file: std::path::PathBuf) -> Self {
        RouteVisitor {
            source_file,
            routes: Vec::new(),
            imports: HashMap::new(),
            route_variables: HashMap::new(),
        }
    }

    /// ObjectLit (例: `{ path: "/studies/:id", name: "StudyDetail", component: StudyDetail, props: true }`)
    /// を受け取り RouteDef を構築して返す
    fn parse_route_object(&self, obj_lit: &ObjectLit) -> RouteDef {
        let mut def = RouteDef {
            path: None,
            name: None,
            component: None,
            module: None,
            props: false,
            has_children: false,
            source_file: self.source_file.clone(),
        };

        for prop in &obj_lit.props {
            let PropOrSpread::Prop(boxed_prop) = prop else {
                continue;
            };
            let Prop::KeyValue(KeyValueProp { key, value }) = &**boxed_prop else {
                continue;
            };
            let Some(key_name) = prop_name(key) else {
                continue;
            };

            match key_name.as_str() {
                "path" => def.path = str_lit(value),
                "name" => def.name = str_lit(value),
                "component" => match unparen(value) {
                    Expr::Ident(ident) => {
                        let local = ident.sym.to_string();
                        def.module = self.imports.get(&local).cloned();
                        def.component = Some(local);
                    }
                    // () => import("@/components/Home")
                    Expr::Arrow(ArrowExpr { body, .. }) => {
                        if let Some(specifier) = lazy_import(body) {
                            def.component = specifier.rsplit('/').next().map(str::to_string);
                            def.module = Some(specifier);
                        }
                    }
                    other => {
                        warn!(file = ?self.source_file, "component の形式を解釈できません: {:?}", other);
                    }
                },
                // props はオブジェクトや関数でも指定できるが、いずれもビューに値を渡す
                "props" => {
                    def.props = match unparen(value) {
                        Expr::Lit(Lit::Bool(Bool { value, .. })) => *value,
                        _ => true,
                    }
                }
                "children" => {
                    if let Expr::Array(arr_lit) = unparen(value) {
                        def.has_children = !arr_lit.elems.is_empty();
                    }
                }
                _ => {}
            }
        }

        debug!(path = ?def.path, name = ?def.name, component = ?def.component, "ルート定義を抽出");
        def
    }

    /// 配列からルート情報を抽出する
    fn extract_routes_from_array(&self, arr_lit: &ArrayLit) -> Vec<RouteDef> {
        object_elems(arr_lit)
            .map(|obj| self.parse_route_object(obj))
            .collect()
    }

    /// 変数参照 (`routes: appRoutes` や `{ routes }`) からルート情報を抽出する
    fn extract_routes_from_variable(&mut self, var_name: &str) {
        match self.route_variables.get(var_name) {
            Some(route_objects) => {
                let defs: Vec<_> = route_objects
                    .iter()
                    .map(|obj| self.parse_route_object(obj))
                    .collect();
                self.routes.extend(defs);
            }
            None => warn!("変数 '{}' の定義が見つかりません", var_name),
        }
    }
}

impl Visit for RouteVisitor {
    /// `import Home from '@/components/Home'` を記録する
    fn visit_import_decl(&mut self, decl: &ImportDecl) {
        for specifier in &decl.specifiers {
            if let ImportSpecifier::Default(ImportDefaultSpecifier { local, .. }) = specifier {
                self.imports
                    .insert(local.sym.to_string(), decl.src.value.to_string());
            }
        }
    }

    /// 変数宣言をキャッチして、route を含む名前の配列を記録する
    fn visit_var_decl(&mut self, var_decl: &VarDecl) {
        for declarator in &var_decl.decls {
            if let Pat::Ident(BindingIdent { id, .. }) = &declarator.name {
                let var_name = id.sym.to_string();
                if !var_name.to_lowercase().contains("route") {
                    continue;
                }
                if let Some(init_expr) = &declarator.init {
                    if let Expr::Array(arr_lit) = unparen(init_expr) {
                        let route_objects: Vec<ObjectLit> = object_elems(arr_lit).cloned().collect();
                        if !route_objects.is_empty() {
                            debug!(var = %var_name, count = route_objects.len(), "ルート配列変数を記録");
                            self.route_variables.insert(var_name, route_objects);
                        }
                    }
                }
            }
        }

        // 子ノードも訪問
        var_decl.visit_children_with(self);
    }

    /// `{ routes }` の省略記法
    fn visit_prop(&mut self, prop: &Prop) {
        if let Prop::Shorthand(ident) = prop {
            if &*ident.sym == "routes" {
                self.extract_routes_from_variable("routes");
                return;
            }
        }
        prop.visit_children_with(self);
    }

    /// `routes: [...]` または `routes: someVariable`
    fn visit_key_value_prop(&mut self, kv: &KeyValueProp) {
        if prop_name(&kv.key).as_deref() == Some("routes") {
            match unparen(&kv.value) {
                Expr::Array(arr_lit) => {
                    let extracted = self.extract_routes_from_array(arr_lit);
                    self.routes.extend(extracted);
                    return;
                }
                Expr::Ident(ident) => {
                    self.extract_routes_from_variable(&ident.sym.to_string());
                    return;
                }
                other => warn!("routes の値が配列でも変数でもありません: {:?}", other),
            }
        }
        kv.visit_children_with(self);
    }
}

fn object_elems(arr_lit: &ArrayLit) -> impl Iterator<Item = &ObjectLit> {
    arr_lit.elems.iter().flatten().filter_map(|elem| match &*elem.expr {
        Expr::Object(obj) => Some(obj),
        _ => None,
    })
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        _ => None,
    }
}

fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(ParenExpr { expr, .. }) => unparen(expr),
        other => other,
    }
}

fn str_lit(expr: &Expr) -> Option<String> {
    match unparen(expr) {
        Expr::Lit(Lit::Str(Str { value, .. })) => Some(value.to_string()),
        _ => None,
    }
}

/// アロー関数本体の `import("…")` から指定子を取り出す
fn lazy_import(body: &BlockStmtOrExpr) -> Option<String> {
    let BlockStmtOrExpr::Expr(expr) = body else {
        return None;
    };
    match unparen(expr) {
        Expr::Call(CallExpr {
            callee: Callee::Import(_),
            args,
            ..
        }) => args.first().and_then(|arg| str_lit(&arg.expr)),
        _ => None,
    }
}

pub fn parse_routes_in_file(file_path: &Path) -> Result<Vec<RouteDef>, SourceError> {
    debug!("ファイル解析開始: {:?}", file_path);

    let src = fs::read_to_string(file_path).map_err(|source| SourceError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;
    parse_routes_in_source(src, file_path)
}

/// ソース文字列を解析する。`file_path` は RouteDef に記録されるだけ。
pub fn parse_routes_in_source(src: String, file_path: &Path) -> Result<Vec<RouteDef>, SourceError> {
    let cm: Lrc<SourceMap> = Default::default();

    let fm = cm.new_source_file(FileName::Real(file_path.to_path_buf()), src);

    // TypeScript構文でパースする設定 (.js もそのまま読める)
    let syntax = Syntax::Typescript(TsConfig {
        tsx: false,
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: true,
    });

    let lexer = Lexer::new(
        syntax,
        Default::default(), // es version
        StringInput::from(&*fm),
        None,
    );

    let mut parser = SwcParser::new_from(lexer);

    let module = parser.parse_module().map_err(|e| SourceError::Parse {
        path: file_path.to_path_buf(),
        message: format!("{:?}", e.kind()),
    })?;

    let mut visitor = RouteVisitor::new(file_path.to_path_buf());
    visitor.visit_module(&module);

    debug!(
        imports = visitor.imports.len(),
        variables = visitor.route_variables.len(),
        routes = visitor.routes.len(),
        "解析完了"
    );

    Ok(visitor.routes)
}
