use xslmapper::core::document::SourceDocument;
use xslmapper::core::registry::{ParameterEntry, ParameterRegistry};
use xslmapper::core::types::ErrorKind;
use xslmapper::core::engine::OutputEncoding;
use xslmapper::core::{execute, CompiledTemplate};

const SII_DTE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<DTE xmlns="http://www.sii.cl/SiiDte" version="1.0">
  <Documento ID="F42T33">
    <Encabezado>
      <IdDoc><TipoDTE>33</TipoDTE><Folio>42</Folio></IdDoc>
      <Emisor><RUTEmisor>76000000-0</RUTEmisor><RznSoc>Comercial Ñandú Ltda.</RznSoc></Emisor>
    </Encabezado>
    <Detalle><NroLinDet>1</NroLinDet><NmbItem>Café</NmbItem><MontoItem>1234.5</MontoItem></Detalle>
    <Detalle><NroLinDet>2</NroLinDet><NmbItem>Té</NmbItem><MontoItem>20</MontoItem></Detalle>
    <TED version="1.0"><DD><RE>76000000-0</RE><TD>33</TD><F>42</F></DD></TED>
  </Documento>
</DTE>"#;

fn compile(text: &str) -> CompiledTemplate {
    CompiledTemplate::from_text(text, "mappers/dte/test.xsl").unwrap()
}

fn stylesheet(top: &str) -> String {
    format!(
        r#"<xsl:stylesheet version="1.0"
    xmlns:xsl="http://www.w3.org/1999/XSL/Transform"
    xmlns:d="http://www.sii.cl/SiiDte"
    xmlns:msxsl="urn:schemas-microsoft-com:xslt"
    exclude-result-prefixes="d msxsl">{}</xsl:stylesheet>"#,
        top
    )
}

fn dte() -> SourceDocument {
    SourceDocument::from_bytes(&encoding_rs::WINDOWS_1252.encode(SII_DTE).0).unwrap()
}

#[test]
fn test_latin1_input_to_csv_lines() {
    let template = compile(&stylesheet(
        r#"<xsl:output method="text" encoding="ISO-8859-1" media-type="text/csv"/>
        <xsl:template match="/">
            <xsl:for-each select="//d:Detalle">
                <xsl:sort select="d:MontoItem" data-type="number"/>
                <xsl:value-of select="d:NmbItem"/>;<xsl:value-of select="format-number(d:MontoItem, '#,##0.00')"/>
                <xsl:text>&#10;</xsl:text>
            </xsl:for-each>
        </xsl:template>"#,
    ));
    let output = execute(&template, &dte(), &ParameterRegistry::new()).unwrap();
    assert_eq!(output.media_type, "text/csv");
    assert_eq!(output.text(), "Té;20.00\nCafé;1,234.50\n");
    assert!(output.bytes.contains(&0xE9));
}

#[test]
fn test_header_mapping_with_modes_and_avts() {
    let template = compile(&stylesheet(
        r#"<xsl:output omit-xml-declaration="yes"/>
        <xsl:strip-space elements="*"/>
        <xsl:template match="d:Documento">
            <Factura id="{@ID}" tipo="{d:Encabezado/d:IdDoc/d:TipoDTE}">
                <Emisor><xsl:value-of select="translate(d:Encabezado/d:Emisor/d:RUTEmisor, '-', '')"/></Emisor>
                <Lineas total="{sum(d:Detalle/d:MontoItem)}"><xsl:apply-templates select="d:Detalle" mode="line"/></Lineas>
            </Factura>
        </xsl:template>
        <xsl:template match="d:Detalle" mode="line"><L n="{position()}"><xsl:value-of select="d:NmbItem"/></L></xsl:template>
        <xsl:template match="d:TED"/>"#,
    ));
    let output = execute(&template, &dte(), &ParameterRegistry::new()).unwrap();
    assert_eq!(
        output.text(),
        "<Factura id=\"F42T33\" tipo=\"33\"><Emisor>760000000</Emisor><Lineas total=\"1254.5\"><L n=\"1\">Café</L><L n=\"2\">Té</L></Lineas></Factura>\n"
    );
}

#[test]
fn test_xml_declaration_names_the_output_encoding() {
    let template = compile(&stylesheet(
        r#"<xsl:output method="xml" encoding="UTF-16BE"/>
        <xsl:template match="/"><f><xsl:value-of select="//d:Folio"/></f></xsl:template>"#,
    ));
    let output = execute(&template, &dte(), &ParameterRegistry::new()).unwrap();
    assert_eq!(output.encoding, OutputEncoding::Utf16Be);
    assert_eq!(&output.bytes[..2], &[0x00, b'<']);
    let text = output.text();
    assert!(text.starts_with("<?xml"), "{}", text);
    assert!(text.contains(r#"encoding="UTF-16BE""#), "{}", text);
    assert!(text.trim_end().ends_with("<f>42</f>"), "{}", text);
}

#[test]
fn test_stamp_parameter_lands_in_an_image_element() {
    let template = compile(&stylesheet(
        r#"<xsl:output omit-xml-declaration="yes"/>
        <xsl:param name="TedTimbre" select="''"/>
        <xsl:template match="/"><img src="{$TedTimbre}" alt="{name(//d:TED)}"/></xsl:template>"#,
    ));
    let mut parameters = ParameterRegistry::new();
    parameters.add_parameter(ParameterEntry::new("TedTimbre", "data:image/png;base64,iVBORw0KGgo="));
    let output = execute(&template, &dte(), &parameters).unwrap();
    assert_eq!(
        output.text(),
        "<img src=\"data:image/png;base64,iVBORw0KGgo=\" alt=\"TED\"/>\n"
    );
}

#[test]
fn test_compilation_failures_are_server_faults() {
    for body in [
        r#"<xsl:import href="common.xsl"/>"#,
        r#"<msxsl:script language="C#" implements-prefix="d">public int f() { return 1; }</msxsl:script>"#,
        r#"<xsl:output method="pdf"/>"#,
        r#"<xsl:template match="/"><xsl:value-of select="1 +"/></xsl:template>"#,
    ] {
        let err = CompiledTemplate::from_text(&stylesheet(body), "mappers/bad.xsl").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TemplateCompilationFailed, "{}", body);
    }
    let err = CompiledTemplate::from_bytes(b"<xsl:stylesheet", "mappers/bad.xsl").unwrap_err();
    assert_eq!(err.kind, ErrorKind::TemplateCompilationFailed);
}

#[test]
fn test_runtime_failures_carry_the_diagnostic() {
    let template = compile(&stylesheet(
        r#"<xsl:template match="/"><xsl:value-of select="d:nope(//d:Folio)"/></xsl:template>"#,
    ));
    let err = execute(&template, &dte(), &ParameterRegistry::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TransformExecutionFailed);
    assert!(err.detail.unwrap_or_default().contains("nope"));
}

#[test]
fn test_lookup_table_embedded_in_the_stylesheet() {
    let template = compile(&stylesheet(
        r#"<xsl:output method="text"/>
        <d:tipos><d:tipo code="33">Factura Electronica</d:tipo><d:tipo code="61">Nota de Credito</d:tipo></d:tipos>
        <xsl:template match="/">
            <xsl:variable name="code" select="//d:TipoDTE"/>
            <xsl:value-of select="document('')/*/d:tipos/d:tipo[@code = $code]"/>
        </xsl:template>"#,
    ));
    let output = execute(&template, &dte(), &ParameterRegistry::new()).unwrap();
    assert_eq!(output.text(), "Factura Electronica");
}

#[test]
fn test_keys_and_numbering() {
    let template = compile(&stylesheet(
        r#"<xsl:output method="text"/>
        <xsl:key name="line" match="d:Detalle" use="d:NroLinDet"/>
        <xsl:template match="/">
            <xsl:value-of select="key('line', '2')/d:NmbItem"/>
            <xsl:for-each select="//d:Detalle">|<xsl:number format="a"/></xsl:for-each>
        </xsl:template>"#,
    ));
    let output = execute(&template, &dte(), &ParameterRegistry::new()).unwrap();
    assert_eq!(output.text(), "Té|a|b");
}
