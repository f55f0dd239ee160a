//! [`XsltEngine`] backed by the system libxslt, with the EXSLT modules and `msxsl:node-set`.
//!
//! Every compile and transform runs on its own `xslt-engine` thread with a stack sized for the
//! processor's recursion limit. That thread carries the call's extension table, resource resolver
//! and diagnostic buffer in thread-locals, which the C callbacks below read.

use super::ffi;
use super::{
    check_depth, EngineError, EngineOutput, OutputEncoding, OutputMethod, OutputSettings,
    PreparedStylesheet, ResourceResolver, XsltEngine,
};
use crate::core::document::{decode_xml_bytes, parse_xml};
use crate::core::modules::{ExtensionError, ExtensionValue};
use crate::core::registry::{ExtensionTable, ParameterRegistry};
use roxmltree::Node;
use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr::{self, NonNull};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, warn};

const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";
const MSXSL_NAMESPACE: &str = "urn:schemas-microsoft-com:xslt";

const ENGINE_STACK_BYTES: usize = 16 * 1024 * 1024;
/// Nested template invocations allowed before the processor reports runaway recursion.
const TEMPLATE_RECURSION_LIMIT: c_int = 5000;
const MAX_DIAGNOSTIC_BYTES: usize = 64 * 1024;
/// Lines of processor output kept in an error; recursion reports dump whole template stacks.
const MAX_ERROR_LINES: usize = 16;

const STYLESHEET_PARSE_OPTIONS: c_int = ffi::XML_PARSE_NOENT
    | ffi::XML_PARSE_NOCDATA
    | ffi::XML_PARSE_NONET
    | ffi::XML_PARSE_IGNORE_ENC;
const INPUT_PARSE_OPTIONS: c_int = ffi::XML_PARSE_NOCDATA
    | ffi::XML_PARSE_NONET
    | ffi::XML_PARSE_HUGE
    | ffi::XML_PARSE_IGNORE_ENC;
const DOCUMENT_PARSE_OPTIONS: c_int =
    ffi::XML_PARSE_NOCDATA | ffi::XML_PARSE_NONET | ffi::XML_PARSE_HUGE;

const INPUT_URL: &[u8] = b"input.xml\0";
const UTF8_LABEL: &[u8] = b"UTF-8\0";

thread_local! {
    static SCOPE: RefCell<Option<CallScope>> = const { RefCell::new(None) };
    static DIAGNOSTICS: RefCell<String> = const { RefCell::new(String::new()) };
}

struct CallScope {
    resources: Arc<dyn ResourceResolver>,
    extensions: ExtensionTable,
}

/// Installs the per-call state on the engine thread for as long as it lives.
struct ScopeGuard;

impl ScopeGuard {
    fn enter(resources: Arc<dyn ResourceResolver>, extensions: ExtensionTable) -> Self {
        SCOPE.with(|scope| {
            *scope.borrow_mut() = Some(CallScope {
                resources,
                extensions,
            })
        });
        DIAGNOSTICS.with(|diagnostics| diagnostics.borrow_mut().clear());
        ScopeGuard
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let _ = SCOPE.try_with(|scope| scope.borrow_mut().take());
    }
}

struct Sink(*mut ffi::FILE);

// The stream is unbuffered and only ever handed to libxml2, which locks it per write.
unsafe impl Send for Sink {}
unsafe impl Sync for Sink {}

/// One-time processor setup; returns the stream all diagnostics are written to.
fn initialize() -> *mut ffi::FILE {
    static SINK: OnceLock<Sink> = OnceLock::new();
    SINK.get_or_init(|| unsafe {
        ffi::xmlInitParser();
        ffi::exsltRegisterAll();
        ffi::xsltRegisterExtModuleFunction(
            b"node-set\0".as_ptr(),
            b"urn:schemas-microsoft-com:xslt\0".as_ptr(),
            ffi::xsltFunctionNodeSet,
        );

        let functions = ffi::cookie_io_functions_t {
            read: None,
            write: Some(capture_write),
            seek: None,
            close: None,
        };
        let sink = ffi::fopencookie(ptr::null_mut(), b"w\0".as_ptr().cast(), functions);
        if sink.is_null() {
            warn!("cannot capture processor diagnostics; they go to stderr");
        } else {
            ffi::setvbuf(sink, ptr::null_mut(), ffi::_IONBF, 0);
        }
        ffi::xsltSetGenericErrorFunc(sink.cast(), None);
        ffi::xmlThrDefSetGenericErrorFunc(sink.cast(), None);
        ffi::xsltSetLoaderFunc(Some(load_resource));
        ffi::xsltMaxDepth = TEMPLATE_RECURSION_LIMIT;
        Sink(sink)
    })
    .0
}

/// Run `work` on a fresh engine thread and wait for it.
fn on_engine_thread<T, F>(work: F) -> Result<T, EngineError>
where
    T: Send,
    F: FnOnce() -> Result<T, EngineError> + Send,
{
    std::thread::scope(|scope| {
        let worker = std::thread::Builder::new()
            .name("xslt-engine".into())
            .stack_size(ENGINE_STACK_BYTES)
            .spawn_scoped(scope, move || {
                let sink = initialize();
                unsafe { ffi::xmlSetGenericErrorFunc(sink.cast(), None) };
                work()
            })
            .map_err(|err| EngineError::Worker(err.to_string()))?;
        worker
            .join()
            .map_err(|payload| EngineError::Worker(panic_message(payload)))?
    })
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_string()
}

/// Panics must not unwind into C.
fn guard_with_default<T>(op: &'static str, default: T, f: impl FnOnce() -> T) -> T {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => value,
        Err(payload) => {
            let message = panic_message(payload);
            error!(op, "panic inside a processor callback: {}", message);
            record_diagnostic(&format!("internal error in {}: {}\n", op, message));
            default
        }
    }
}

fn record_diagnostic(text: &str) {
    let _ = DIAGNOSTICS.try_with(|diagnostics| {
        if let Ok(mut diagnostics) = diagnostics.try_borrow_mut() {
            if diagnostics.len() < MAX_DIAGNOSTIC_BYTES {
                diagnostics.push_str(text);
            }
        }
    });
}

/// Non-empty diagnostic lines recorded on this thread since the call began.
fn take_diagnostics() -> Vec<String> {
    let text = DIAGNOSTICS
        .try_with(|diagnostics| std::mem::take(&mut *diagnostics.borrow_mut()))
        .unwrap_or_default();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn describe(diagnostics: Vec<String>, fallback: &str) -> String {
    if diagnostics.is_empty() {
        fallback.to_string()
    } else {
        let mut lines = diagnostics;
        lines.truncate(MAX_ERROR_LINES);
        lines.join("; ")
    }
}

unsafe extern "C" fn capture_write(_cookie: *mut c_void, buffer: *const c_char, size: usize) -> isize {
    guard_with_default("diagnostic sink", size as isize, || {
        if !buffer.is_null() && size > 0 {
            let bytes = unsafe { std::slice::from_raw_parts(buffer.cast::<u8>(), size) };
            record_diagnostic(&String::from_utf8_lossy(bytes));
        }
        size as isize
    })
}

/// Loader for `xsl:import`, `xsl:include` and `document()`. A null return lets the processor
/// fall back to its own handling: `document('')` then reads the stylesheet itself.
unsafe extern "C" fn load_resource(
    uri: *const ffi::xmlChar,
    _dict: *mut ffi::xmlDict,
    options: c_int,
    _ctxt: *mut c_void,
    load_type: c_int,
) -> *mut ffi::xmlDoc {
    guard_with_default("resource loader", ptr::null_mut(), || unsafe {
        load(uri, options, load_type)
    })
}

unsafe fn load(uri: *const ffi::xmlChar, options: c_int, load_type: c_int) -> *mut ffi::xmlDoc {
    if uri.is_null() {
        return ptr::null_mut();
    }
    let location = CStr::from_ptr(uri.cast()).to_string_lossy().into_owned();
    let resources = SCOPE.with(|scope| {
        scope
            .borrow()
            .as_ref()
            .map(|scope| Arc::clone(&scope.resources))
    });
    let Some(bytes) = resources.and_then(|resources| resources.load(&location)) else {
        debug!(uri = %location, load_type, "resource not available");
        return ptr::null_mut();
    };

    let text = match decode_xml_bytes(&bytes) {
        Ok(text) => text,
        Err(reason) => {
            record_diagnostic(&format!("resource {} {}\n", location, reason));
            return ptr::null_mut();
        }
    };
    let checked = parse_xml(&text)
        .map_err(|err| err.to_string())
        .and_then(|document| check_depth(&document).map_err(|err| err.to_string()));
    if let Err(reason) = checked {
        record_diagnostic(&format!("resource {}: {}\n", location, reason));
        return ptr::null_mut();
    }
    let Ok(length) = c_int::try_from(text.len()) else {
        record_diagnostic(&format!("resource {} is too large\n", location));
        return ptr::null_mut();
    };
    debug!(uri = %location, bytes = text.len(), "resource loaded");
    ffi::xmlReadMemory(
        text.as_ptr().cast(),
        length,
        uri.cast(),
        UTF8_LABEL.as_ptr().cast(),
        options | ffi::XML_PARSE_IGNORE_ENC,
    )
}

/// Every registered extension function is bound to this trampoline; the processor tells it
/// which `{namespace}name` was called.
unsafe extern "C" fn call_extension(ctxt: *mut ffi::xmlXPathParserContext, nargs: c_int) {
    guard_with_default("extension call", (), || unsafe { dispatch(ctxt, nargs) })
}

unsafe fn dispatch(ctxt: *mut ffi::xmlXPathParserContext, nargs: c_int) {
    if ctxt.is_null() || (*ctxt).context.is_null() {
        return;
    }
    let context = &*(*ctxt).context;
    let name = c_text(context.function);
    let namespace = c_text(context.functionURI);

    let mut args = Vec::with_capacity(nargs.max(0) as usize);
    for _ in 0..nargs.max(0) {
        let object = ffi::valuePop(ctxt);
        if object.is_null() {
            ffi::xmlXPathErr(ctxt, ffi::XPATH_STACK_ERROR);
            return;
        }
        args.push(to_extension_value(object));
        ffi::xmlXPathFreeObject(object);
    }
    args.reverse();

    let object = SCOPE.with(|scope| {
        scope
            .borrow()
            .as_ref()
            .and_then(|scope| scope.extensions.get(&namespace).cloned())
    });
    let outcome = match object {
        Some(object) => object.call(&name, &args),
        None => Err(ExtensionError::UnknownFunction {
            name: name.clone(),
            arity: args.len(),
        }),
    };

    match outcome {
        Ok(value) => {
            let result = to_xpath_object(&value);
            if result.is_null() {
                ffi::xmlXPathErr(ctxt, ffi::XPATH_EXPR_ERROR);
            } else {
                ffi::valuePush(ctxt, result);
            }
        }
        Err(err) => {
            record_diagnostic(&format!(
                "extension function in namespace {} failed: {}\n",
                namespace, err
            ));
            let code = match err {
                ExtensionError::UnknownFunction { .. } => ffi::XPATH_UNKNOWN_FUNC_ERROR,
                ExtensionError::Failed { .. } => ffi::XPATH_EXPR_ERROR,
            };
            ffi::xmlXPathErr(ctxt, code);
        }
    }
}

unsafe fn c_text(text: *const ffi::xmlChar) -> String {
    if text.is_null() {
        return String::new();
    }
    CStr::from_ptr(text.cast()).to_string_lossy().into_owned()
}

/// Copy and release a string the processor allocated.
unsafe fn take_xml_string(text: *mut ffi::xmlChar) -> String {
    let owned = c_text(text);
    free_xml(text.cast());
    owned
}

unsafe fn free_xml(memory: *mut c_void) {
    if memory.is_null() {
        return;
    }
    if let Some(free) = ffi::xmlFree {
        free(memory);
    }
}

unsafe fn to_extension_value(object: *mut ffi::xmlXPathObject) -> ExtensionValue {
    match (*object).type_ {
        ffi::XPATH_BOOLEAN => ExtensionValue::Boolean(ffi::xmlXPathCastToBoolean(object) != 0),
        ffi::XPATH_NUMBER => ExtensionValue::Number(ffi::xmlXPathCastToNumber(object)),
        _ => ExtensionValue::String(take_xml_string(ffi::xmlXPathCastToString(object))),
    }
}

unsafe fn to_xpath_object(value: &ExtensionValue) -> *mut ffi::xmlXPathObject {
    match value {
        ExtensionValue::Boolean(value) => ffi::xmlXPathNewBoolean(c_int::from(*value)),
        ExtensionValue::Number(value) => ffi::xmlXPathNewFloat(*value),
        ExtensionValue::String(_) | ExtensionValue::List(_) => {
            let text = CString::new(value.to_xpath_string().replace('\0', "")).unwrap_or_default();
            ffi::xmlXPathNewString(text.as_ptr().cast())
        }
    }
}

/// Owned libxml2 document, freed on drop.
struct OwnedDoc(NonNull<ffi::xmlDoc>);

impl OwnedDoc {
    fn new(doc: *mut ffi::xmlDoc) -> Option<Self> {
        NonNull::new(doc).map(OwnedDoc)
    }

    fn as_ptr(&self) -> *mut ffi::xmlDoc {
        self.0.as_ptr()
    }
}

impl Drop for OwnedDoc {
    fn drop(&mut self) {
        unsafe { ffi::xmlFreeDoc(self.0.as_ptr()) }
    }
}

struct OwnedTransform(NonNull<ffi::xsltTransformContext>);

impl Drop for OwnedTransform {
    fn drop(&mut self) {
        unsafe { ffi::xsltFreeTransformContext(self.0.as_ptr()) }
    }
}

/// Compiled libxslt stylesheet, freed on drop.
struct StylesheetHandle(NonNull<ffi::xsltStylesheet>);

// A compiled stylesheet is only read during transformations, which libxslt allows from
// several threads at once.
unsafe impl Send for StylesheetHandle {}
unsafe impl Sync for StylesheetHandle {}

impl Drop for StylesheetHandle {
    fn drop(&mut self) {
        unsafe { ffi::xsltFreeStylesheet(self.0.as_ptr()) }
    }
}

/// The system libxslt processor.
#[derive(Debug, Default, Clone, Copy)]
pub struct LibXslt;

impl LibXslt {
    pub fn new() -> Self {
        LibXslt
    }
}

impl XsltEngine for LibXslt {
    fn engine_name(&self) -> &'static str {
        "libxslt"
    }

    fn engine_version(&self) -> String {
        let version = unsafe { ffi::xsltLibxsltVersion };
        format!(
            "{}.{}.{}",
            version / 10000,
            version / 100 % 100,
            version % 100
        )
    }

    fn compile(
        &self,
        source: &[u8],
        base_uri: &str,
        resources: Arc<dyn ResourceResolver>,
    ) -> Result<Arc<dyn PreparedStylesheet>, EngineError> {
        let text = decode_xml_bytes(source)
            .map_err(|reason| EngineError::Compile(format!("stylesheet {}", reason)))?;
        let output = inspect(&text)?;
        let url = CString::new(base_uri)
            .map_err(|_| EngineError::Compile("stylesheet URI contains a NUL character".into()))?;
        let length = c_int::try_from(text.len())
            .map_err(|_| EngineError::Compile("stylesheet is too large".into()))?;

        let handle = on_engine_thread(|| {
            let _scope = ScopeGuard::enter(Arc::clone(&resources), ExtensionTable::new());
            unsafe {
                let doc = ffi::xmlReadMemory(
                    text.as_ptr().cast(),
                    length,
                    url.as_ptr(),
                    UTF8_LABEL.as_ptr().cast(),
                    STYLESHEET_PARSE_OPTIONS,
                );
                if doc.is_null() {
                    return Err(EngineError::Compile(describe(
                        take_diagnostics(),
                        "stylesheet is not well-formed XML",
                    )));
                }
                // On success the stylesheet owns the document.
                match NonNull::new(ffi::xsltParseStylesheetDoc(doc)) {
                    Some(stylesheet) => Ok(StylesheetHandle(stylesheet)),
                    None => {
                        ffi::xmlFreeDoc(doc);
                        Err(EngineError::Compile(describe(
                            take_diagnostics(),
                            "stylesheet does not compile",
                        )))
                    }
                }
            }
        })?;

        debug!(uri = base_uri, "stylesheet compiled");
        Ok(Arc::new(LibXsltStylesheet {
            handle,
            output,
            resources,
        }))
    }
}

struct LibXsltStylesheet {
    handle: StylesheetHandle,
    output: OutputSettings,
    resources: Arc<dyn ResourceResolver>,
}

impl fmt::Debug for LibXsltStylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibXsltStylesheet")
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl PreparedStylesheet for LibXsltStylesheet {
    fn output(&self) -> &OutputSettings {
        &self.output
    }

    fn transform(
        &self,
        input: &str,
        parameters: &ParameterRegistry,
    ) -> Result<EngineOutput, EngineError> {
        let parsed = parse_xml(input).map_err(|err| EngineError::Input(err.to_string()))?;
        check_depth(&parsed)?;
        drop(parsed);

        let length = c_int::try_from(input.len())
            .map_err(|_| EngineError::Input("input document is too large".into()))?;
        let user_parameters = user_parameters(parameters)?;
        let functions = extension_functions(&parameters.extensions)?;

        on_engine_thread(|| {
            let _scope = ScopeGuard::enter(
                Arc::clone(&self.resources),
                parameters.extensions.clone(),
            );
            unsafe { self.run(input, length, &user_parameters, &functions) }
        })
    }
}

impl LibXsltStylesheet {
    unsafe fn run(
        &self,
        input: &str,
        length: c_int,
        user_parameters: &[CString],
        functions: &[(CString, CString)],
    ) -> Result<EngineOutput, EngineError> {
        let stylesheet = self.handle.0.as_ptr();
        let document = OwnedDoc::new(ffi::xmlReadMemory(
            input.as_ptr().cast(),
            length,
            INPUT_URL.as_ptr().cast(),
            UTF8_LABEL.as_ptr().cast(),
            INPUT_PARSE_OPTIONS,
        ))
        .ok_or_else(|| {
            EngineError::Input(describe(take_diagnostics(), "input document cannot be parsed"))
        })?;

        let context = NonNull::new(ffi::xsltNewTransformContext(stylesheet, document.as_ptr()))
            .map(OwnedTransform)
            .ok_or_else(|| {
                EngineError::Runtime(describe(take_diagnostics(), "cannot create a transform context"))
            })?;
        ffi::xsltSetCtxtParseOptions(context.0.as_ptr(), DOCUMENT_PARSE_OPTIONS);

        for (name, namespace) in functions {
            ffi::xsltRegisterExtFunction(
                context.0.as_ptr(),
                name.as_ptr().cast(),
                namespace.as_ptr().cast(),
                call_extension,
            );
        }

        let mut pairs: Vec<*const c_char> = user_parameters
            .iter()
            .map(|text| text.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        if ffi::xsltQuoteUserParams(context.0.as_ptr(), pairs.as_mut_ptr()) != 0 {
            return Err(EngineError::Runtime(describe(
                take_diagnostics(),
                "stylesheet parameters were rejected",
            )));
        }

        let result = OwnedDoc::new(ffi::xsltApplyStylesheetUser(
            stylesheet,
            document.as_ptr(),
            ptr::null_mut(),
            ptr::null(),
            ptr::null_mut(),
            context.0.as_ptr(),
        ))
        .ok_or_else(|| EngineError::Runtime(describe(take_diagnostics(), "transformation failed")))?;

        let method = self.output.method.unwrap_or(
            if (*result.as_ptr()).type_ == ffi::XML_HTML_DOCUMENT_NODE {
                OutputMethod::Html
            } else {
                OutputMethod::Xml
            },
        );

        let mut text: *mut ffi::xmlChar = ptr::null_mut();
        let mut size: c_int = 0;
        if ffi::xsltSaveResultToString(&mut text, &mut size, result.as_ptr(), stylesheet) != 0 {
            free_xml(text.cast());
            return Err(EngineError::Runtime(describe(
                take_diagnostics(),
                "result cannot be serialized",
            )));
        }
        let bytes = if text.is_null() || size <= 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(text, size as usize).to_vec()
        };
        free_xml(text.cast());

        Ok(EngineOutput {
            bytes,
            method,
            messages: take_diagnostics(),
        })
    }
}

/// Flattened `name, value` pairs; namespaced parameters use `{uri}name`.
fn user_parameters(parameters: &ParameterRegistry) -> Result<Vec<CString>, EngineError> {
    let mut pairs = Vec::new();
    for (namespace, name, value) in parameters.parameters() {
        let qualified = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{{{}}}{}", namespace, name)
        };
        for text in [qualified, value.to_string()] {
            pairs.push(CString::new(text).map_err(|_| {
                EngineError::Runtime(format!("parameter {} contains a NUL character", name))
            })?);
        }
    }
    Ok(pairs)
}

/// `(function, namespace)` for every name each registered object answers to.
fn extension_functions(extensions: &ExtensionTable) -> Result<Vec<(CString, CString)>, EngineError> {
    let mut functions = Vec::new();
    for (namespace, object) in extensions.iter() {
        let uri = CString::new(namespace).map_err(|_| {
            EngineError::Runtime(format!("extension namespace {} contains a NUL character", namespace))
        })?;
        for name in object.function_names() {
            let Ok(name) = CString::new(name) else {
                continue;
            };
            functions.push((name, uri.clone()));
        }
    }
    Ok(functions)
}

/// Read what the adapter needs from the stylesheet before the processor sees it: the merged
/// `xsl:output` settings, the nesting depth, and any inline script block.
fn inspect(text: &str) -> Result<OutputSettings, EngineError> {
    let document = parse_xml(text)
        .map_err(|err| EngineError::Compile(format!("stylesheet is not well-formed XML: {}", err)))?;
    check_depth(&document)?;

    let mut output = OutputSettings::default();
    for child in document.root_element().children().filter(Node::is_element) {
        let name = child.tag_name();
        match (name.namespace(), name.name()) {
            (Some(MSXSL_NAMESPACE), "script") => {
                return Err(EngineError::ScriptBlock {
                    language: child.attribute("language").unwrap_or("C#").to_string(),
                });
            }
            (Some(XSLT_NAMESPACE), "output") => read_output(child, &mut output)?,
            _ => {}
        }
    }
    Ok(output)
}

fn read_output(node: Node<'_, '_>, output: &mut OutputSettings) -> Result<(), EngineError> {
    if let Some(method) = node.attribute("method") {
        output.method = Some(OutputMethod::from_name(method.trim()).ok_or_else(|| {
            EngineError::Compile(format!("output method '{}' is not supported", method))
        })?);
    }
    if let Some(encoding) = node.attribute("encoding") {
        if OutputEncoding::from_label(encoding).is_none() {
            return Err(EngineError::Compile(format!(
                "output encoding '{}' is not supported",
                encoding
            )));
        }
        output.encoding = Some(encoding.trim().to_string());
    }
    if let Some(indent) = yes_no(node, "indent")? {
        output.indent = Some(indent);
    }
    if let Some(omit) = yes_no(node, "omit-xml-declaration")? {
        output.omit_xml_declaration = omit;
    }
    if let Some(media_type) = node.attribute("media-type") {
        output.media_type = Some(media_type.trim().to_string());
    }
    Ok(())
}

fn yes_no(node: Node<'_, '_>, attribute: &str) -> Result<Option<bool>, EngineError> {
    match node.attribute(attribute).map(str::trim) {
        None => Ok(None),
        Some("yes") => Ok(Some(true)),
        Some("no") => Ok(Some(false)),
        Some(other) => Err(EngineError::Compile(format!(
            "{} must be yes or no, not '{}'",
            attribute, other
        ))),
    }
}
