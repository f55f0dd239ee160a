fn main() {
    // The XSLT engine binds the system libxslt; libexslt supplies the EXSLT extension modules.
    println!("cargo:rustc-link-lib=xslt");
    println!("cargo:rustc-link-lib=exslt");
    println!("cargo:rustc-link-lib=xml2");
    println!("cargo:rerun-if-changed=build.rs");
}
