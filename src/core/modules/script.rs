use super::{ExtensionError, ExtensionObject, ExtensionValue, InstantiationError, ModuleRuntime};
use rhai::{Array, CallFnOptions, Dynamic, Engine, Scope, AST, FLOAT, INT};
use std::borrow::Cow;
use std::sync::Arc;

/// Constant a module script uses to declare the class it implements.
pub const CLASS_CONSTANT: &str = "CLASS";

/// Module runtime whose binaries are Rhai scripts:
///
/// ```text
/// const CLASS = "Acme.Format";
/// fn pad_left(value, width) { ... }
/// ```
///
/// XPath function names map onto script functions with hyphens replaced by underscores.
pub struct RhaiModuleRuntime {
    engine: Arc<Engine>,
}

impl Default for RhaiModuleRuntime {
    fn default() -> Self {
        let mut engine = Engine::new();
        engine.set_max_operations(500_000);
        engine.set_max_call_levels(64);
        engine.set_max_expr_depths(64, 64);
        engine.set_max_string_size(1 << 20);
        engine.set_max_array_size(10_000);
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});
        RhaiModuleRuntime {
            engine: Arc::new(engine),
        }
    }
}

impl ModuleRuntime for RhaiModuleRuntime {
    fn instantiate(
        &self,
        binary: &[u8],
        class_name: &str,
    ) -> Result<Arc<dyn ExtensionObject>, InstantiationError> {
        let source = std::str::from_utf8(binary)
            .map_err(|err| InstantiationError::Incompatible(format!("not UTF-8 text: {}", err)))?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let ast = self
            .engine
            .compile(source)
            .map_err(|err| InstantiationError::Incompatible(err.to_string()))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|err| InstantiationError::Incompatible(err.to_string()))?;

        match scope.get_value::<rhai::ImmutableString>(CLASS_CONSTANT) {
            None => Err(InstantiationError::MissingClass {
                requested: class_name.to_string(),
            }),
            Some(declared) if declared.as_str() != class_name => {
                Err(InstantiationError::ClassMismatch {
                    requested: class_name.to_string(),
                    declared: declared.to_string(),
                })
            }
            Some(_) => Ok(Arc::new(ScriptObject {
                class_name: class_name.to_string(),
                engine: Arc::clone(&self.engine),
                ast,
                scope,
            })),
        }
    }
}

struct ScriptObject {
    class_name: String,
    engine: Arc<Engine>,
    ast: AST,
    scope: Scope<'static>,
}

fn script_name(name: &str) -> Cow<'_, str> {
    if name.contains('-') {
        Cow::Owned(name.replace('-', "_"))
    } else {
        Cow::Borrowed(name)
    }
}

impl ExtensionObject for ScriptObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for function in self.ast.iter_functions() {
            let hyphenated = function.name.replace('_', "-");
            for name in [function.name.to_string(), hyphenated] {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn has_function(&self, name: &str, arity: usize) -> bool {
        let name = script_name(name);
        self.ast
            .iter_functions()
            .any(|function| function.name == name.as_ref() && function.params.len() == arity)
    }

    fn call(&self, name: &str, args: &[ExtensionValue]) -> Result<ExtensionValue, ExtensionError> {
        if !self.has_function(name, args.len()) {
            return Err(ExtensionError::UnknownFunction {
                name: name.to_string(),
                arity: args.len(),
            });
        }
        let function = script_name(name);
        let args: Vec<Dynamic> = args.iter().map(to_dynamic).collect();
        let mut scope = self.scope.clone();
        let options = CallFnOptions::new().eval_ast(false).rewind_scope(true);
        let result = self
            .engine
            .call_fn_with_options::<Dynamic>(options, &mut scope, &self.ast, function.as_ref(), args)
            .map_err(|err| ExtensionError::Failed {
                function: name.to_string(),
                message: err.to_string(),
            })?;
        Ok(from_dynamic(result))
    }
}

fn to_dynamic(value: &ExtensionValue) -> Dynamic {
    match value {
        ExtensionValue::String(value) => Dynamic::from(value.clone()),
        ExtensionValue::Number(value) => {
            if value.fract() == 0.0 && value.abs() < 9.0e15 {
                Dynamic::from(*value as INT)
            } else {
                Dynamic::from(*value as FLOAT)
            }
        }
        ExtensionValue::Boolean(value) => Dynamic::from(*value),
        ExtensionValue::List(items) => {
            Dynamic::from_array(items.iter().map(to_dynamic).collect::<Array>())
        }
    }
}

fn from_dynamic(value: Dynamic) -> ExtensionValue {
    if value.is_unit() {
        return ExtensionValue::String(String::new());
    }
    if let Some(b) = value.clone().try_cast::<bool>() {
        return ExtensionValue::Boolean(b);
    }
    if let Some(i) = value.clone().try_cast::<INT>() {
        return ExtensionValue::Number(i as f64);
    }
    if let Some(f) = value.clone().try_cast::<FLOAT>() {
        return ExtensionValue::Number(f);
    }
    if let Some(s) = value.clone().try_cast::<String>() {
        return ExtensionValue::String(s);
    }
    if let Some(arr) = value.clone().try_cast::<Array>() {
        return ExtensionValue::List(arr.into_iter().map(from_dynamic).collect());
    }
    ExtensionValue::String(value.to_string())
}
