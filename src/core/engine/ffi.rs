//! Raw bindings to the system libxml2, libxslt and libexslt.
//!
//! Only the prefixes of the C structs the adapter reads are mirrored; the layouts match
//! libxml2 2.9 / libxslt 1.1 on LP64 targets.

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals, dead_code)]

use std::ffi::{c_char, c_double, c_int, c_void};

pub type xmlChar = u8;

macro_rules! opaque {
    ($($name:ident),* $(,)?) => {
        $(
            #[repr(C)]
            pub struct $name {
                _private: [u8; 0],
            }
        )*
    };
}

opaque!(xmlDict, xsltStylesheet, xsltTransformContext, FILE);

#[repr(C)]
pub struct xmlDoc {
    pub _private: *mut c_void,
    pub type_: c_int,
}

pub const XML_HTML_DOCUMENT_NODE: c_int = 13;

#[repr(C)]
pub struct xmlXPathObject {
    pub type_: c_int,
}

pub const XPATH_BOOLEAN: c_int = 2;
pub const XPATH_NUMBER: c_int = 3;

#[repr(C)]
pub struct xmlXPathContext {
    pub doc: *mut xmlDoc,
    pub node: *mut c_void,
    pub nb_variables_unused: c_int,
    pub max_variables_unused: c_int,
    pub varHash: *mut c_void,
    pub nb_types: c_int,
    pub max_types: c_int,
    pub types: *mut c_void,
    pub nb_funcs_unused: c_int,
    pub max_funcs_unused: c_int,
    pub funcHash: *mut c_void,
    pub nb_axis: c_int,
    pub max_axis: c_int,
    pub axis: *mut c_void,
    pub namespaces: *mut *mut c_void,
    pub nsNr: c_int,
    pub user: *mut c_void,
    pub contextSize: c_int,
    pub proximityPosition: c_int,
    pub xptr: c_int,
    pub here: *mut c_void,
    pub origin: *mut c_void,
    pub nsHash: *mut c_void,
    pub varLookupFunc: *mut c_void,
    pub varLookupData: *mut c_void,
    pub extra: *mut c_void,
    pub function: *const xmlChar,
    pub functionURI: *const xmlChar,
}

#[repr(C)]
pub struct xmlXPathParserContext {
    pub cur: *const xmlChar,
    pub base: *const xmlChar,
    pub error: c_int,
    pub context: *mut xmlXPathContext,
    pub value: *mut xmlXPathObject,
}

pub const XPATH_EXPR_ERROR: c_int = 7;
pub const XPATH_UNKNOWN_FUNC_ERROR: c_int = 9;
pub const XPATH_INVALID_ARITY: c_int = 12;
pub const XPATH_STACK_ERROR: c_int = 23;

pub const XML_PARSE_NOENT: c_int = 1 << 1;
pub const XML_PARSE_NONET: c_int = 1 << 11;
pub const XML_PARSE_NOCDATA: c_int = 1 << 14;
pub const XML_PARSE_HUGE: c_int = 1 << 19;
pub const XML_PARSE_IGNORE_ENC: c_int = 1 << 21;

pub const XSLT_LOAD_STYLESHEET: c_int = 1;
pub const XSLT_LOAD_DOCUMENT: c_int = 2;

pub type xmlXPathFunction = unsafe extern "C" fn(ctxt: *mut xmlXPathParserContext, nargs: c_int);

pub type xmlGenericErrorFunc = unsafe extern "C" fn(ctx: *mut c_void, msg: *const c_char, ...);

pub type xsltDocLoaderFunc = unsafe extern "C" fn(
    uri: *const xmlChar,
    dict: *mut xmlDict,
    options: c_int,
    ctxt: *mut c_void,
    load_type: c_int,
) -> *mut xmlDoc;

pub type xmlFreeFunc = unsafe extern "C" fn(mem: *mut c_void);

#[repr(C)]
pub struct cookie_io_functions_t {
    pub read: Option<unsafe extern "C" fn(*mut c_void, *mut c_char, usize) -> isize>,
    pub write: Option<unsafe extern "C" fn(*mut c_void, *const c_char, usize) -> isize>,
    pub seek: Option<unsafe extern "C" fn(*mut c_void, *mut i64, c_int) -> c_int>,
    pub close: Option<unsafe extern "C" fn(*mut c_void) -> c_int>,
}

pub const _IONBF: c_int = 2;

extern "C" {
    pub static xmlFree: Option<xmlFreeFunc>;
    pub static mut xsltMaxDepth: c_int;
    pub static xsltLibxsltVersion: c_int;

    pub fn xmlInitParser();
    pub fn xmlSetGenericErrorFunc(ctx: *mut c_void, handler: Option<xmlGenericErrorFunc>);
    pub fn xmlThrDefSetGenericErrorFunc(ctx: *mut c_void, handler: Option<xmlGenericErrorFunc>);
    pub fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut xmlDoc;
    pub fn xmlFreeDoc(doc: *mut xmlDoc);

    pub fn valuePop(ctxt: *mut xmlXPathParserContext) -> *mut xmlXPathObject;
    pub fn valuePush(ctxt: *mut xmlXPathParserContext, value: *mut xmlXPathObject) -> c_int;
    pub fn xmlXPathErr(ctxt: *mut xmlXPathParserContext, error: c_int);
    pub fn xmlXPathFreeObject(obj: *mut xmlXPathObject);
    pub fn xmlXPathCastToBoolean(obj: *mut xmlXPathObject) -> c_int;
    pub fn xmlXPathCastToNumber(obj: *mut xmlXPathObject) -> c_double;
    pub fn xmlXPathCastToString(obj: *mut xmlXPathObject) -> *mut xmlChar;
    pub fn xmlXPathNewString(value: *const xmlChar) -> *mut xmlXPathObject;
    pub fn xmlXPathNewFloat(value: c_double) -> *mut xmlXPathObject;
    pub fn xmlXPathNewBoolean(value: c_int) -> *mut xmlXPathObject;

    pub fn xsltSetGenericErrorFunc(ctx: *mut c_void, handler: Option<xmlGenericErrorFunc>);
    pub fn xsltSetLoaderFunc(loader: Option<xsltDocLoaderFunc>);
    pub fn xsltRegisterExtModuleFunction(
        name: *const xmlChar,
        uri: *const xmlChar,
        function: xmlXPathFunction,
    ) -> c_int;
    pub fn xsltFunctionNodeSet(ctxt: *mut xmlXPathParserContext, nargs: c_int);
    pub fn xsltParseStylesheetDoc(doc: *mut xmlDoc) -> *mut xsltStylesheet;
    pub fn xsltFreeStylesheet(style: *mut xsltStylesheet);
    pub fn xsltNewTransformContext(
        style: *mut xsltStylesheet,
        doc: *mut xmlDoc,
    ) -> *mut xsltTransformContext;
    pub fn xsltFreeTransformContext(ctxt: *mut xsltTransformContext);
    pub fn xsltSetCtxtParseOptions(ctxt: *mut xsltTransformContext, options: c_int) -> c_int;
    pub fn xsltRegisterExtFunction(
        ctxt: *mut xsltTransformContext,
        name: *const xmlChar,
        uri: *const xmlChar,
        function: xmlXPathFunction,
    ) -> c_int;
    pub fn xsltQuoteUserParams(ctxt: *mut xsltTransformContext, params: *mut *const c_char) -> c_int;
    pub fn xsltApplyStylesheetUser(
        style: *mut xsltStylesheet,
        doc: *mut xmlDoc,
        params: *mut *const c_char,
        output: *const c_char,
        profile: *mut FILE,
        user_ctxt: *mut xsltTransformContext,
    ) -> *mut xmlDoc;
    pub fn xsltSaveResultToString(
        doc_txt: *mut *mut xmlChar,
        doc_txt_len: *mut c_int,
        result: *mut xmlDoc,
        style: *mut xsltStylesheet,
    ) -> c_int;

    pub fn exsltRegisterAll();

    pub fn fopencookie(
        cookie: *mut c_void,
        mode: *const c_char,
        functions: cookie_io_functions_t,
    ) -> *mut FILE;
    pub fn setvbuf(stream: *mut FILE, buffer: *mut c_char, mode: c_int, size: usize) -> c_int;
}
