//! The XML parts of a minimal WordprocessingML package.

use crate::body::{BodyWidth, Placement, page_number_paragraph, write_blocks};
use quick_xml::escape::escape;
use quire_layout::{LayoutModel, ResolvedSection};
use quire_types::{Orientation, mm_to_twips};
use std::fmt::Write;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

pub const HEADER_PART: &str = "word/header1.xml";
pub const FOOTER_PART: &str = "word/footer1.xml";

/// What the package contains beyond the fixed parts.
#[derive(Debug, Clone, Copy)]
pub struct PackageLayout {
    pub header: bool,
    pub footer: bool,
}

pub fn content_types(layout: PackageLayout) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    let wml = "application/vnd.openxmlformats-officedocument.wordprocessingml";
    let _ = write!(xml, r#"<Override PartName="/word/document.xml" ContentType="{}.document.main+xml"/>"#, wml);
    let _ = write!(xml, r#"<Override PartName="/word/styles.xml" ContentType="{}.styles+xml"/>"#, wml);
    if layout.header {
        let _ = write!(xml, r#"<Override PartName="/{}" ContentType="{}.header+xml"/>"#, HEADER_PART, wml);
    }
    if layout.footer {
        let _ = write!(xml, r#"<Override PartName="/{}" ContentType="{}.footer+xml"/>"#, FOOTER_PART, wml);
    }
    xml.push_str(r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#);
    xml.push_str(r#"<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#);
    xml.push_str("</Types>");
    xml
}

pub fn package_rels() -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    let _ = write!(xml, r#"<Relationship Id="rId1" Type="{}/officeDocument" Target="word/document.xml"/>"#, REL);
    xml.push_str(r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#);
    let _ = write!(xml, r#"<Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/>"#, REL);
    xml.push_str("</Relationships>");
    xml
}

pub fn document_rels(layout: PackageLayout) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    let _ = write!(xml, r#"<Relationship Id="rIdStyles" Type="{}/styles" Target="styles.xml"/>"#, REL);
    if layout.header {
        let _ = write!(xml, r#"<Relationship Id="rIdHeader1" Type="{}/header" Target="header1.xml"/>"#, REL);
    }
    if layout.footer {
        let _ = write!(xml, r#"<Relationship Id="rIdFooter1" Type="{}/footer" Target="footer1.xml"/>"#, REL);
    }
    xml.push_str("</Relationships>");
    xml
}

/// Text width between the left and right margins, in twips.
pub fn body_width(model: &LayoutModel) -> BodyWidth {
    let (width, _) = model.page_setup.dimensions_twips();
    let margins = &model.page_setup.margins;
    BodyWidth(width.saturating_sub(mm_to_twips(margins.left) + mm_to_twips(margins.right)))
}

pub fn document(model: &LayoutModel, layout: PackageLayout) -> String {
    let mut xml = String::from(XML_DECL);
    let _ = write!(xml, r#"<w:document xmlns:w="{}" xmlns:r="{}"><w:body>"#, NS_W, NS_R);
    write_blocks(&mut xml, &model.content().blocks, body_width(model), Placement::Body);

    xml.push_str("<w:sectPr>");
    if layout.header {
        xml.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader1"/>"#);
    }
    if layout.footer {
        xml.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter1"/>"#);
    }
    let setup = &model.page_setup;
    let (w, h) = setup.dimensions_twips();
    let orient = match setup.orientation {
        Orientation::Portrait => "",
        Orientation::Landscape => r#" w:orient="landscape""#,
    };
    let _ = write!(xml, r#"<w:pgSz w:w="{}" w:h="{}"{}/>"#, w, h, orient);
    let m = &setup.margins;
    let _ = write!(
        xml,
        r#"<w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/>"#,
        mm_to_twips(m.top),
        mm_to_twips(m.right),
        mm_to_twips(m.bottom),
        mm_to_twips(m.left),
        mm_to_twips(m.top / 2.0),
        mm_to_twips(m.bottom / 2.0),
    );
    xml.push_str("</w:sectPr></w:body></w:document>");
    xml
}

fn pinned_part(
    root: &str,
    placement: Placement,
    model: &LayoutModel,
    section: Option<&ResolvedSection>,
    extra: impl FnOnce(&mut String),
) -> String {
    let mut xml = String::from(XML_DECL);
    let _ = write!(
        xml,
        r#"<w:{} xmlns:w="{}" xmlns:r="{}" xmlns:v="urn:schemas-microsoft-com:vml" xmlns:o="urn:schemas-microsoft-com:office:office">"#,
        root, NS_W, NS_R
    );
    let before = xml.len();
    if let Some(section) = section {
        write_blocks(&mut xml, &section.blocks, body_width(model), placement);
    }
    extra(&mut xml);
    if xml.len() == before {
        // A header or footer part needs at least one paragraph.
        xml.push_str("<w:p/>");
    }
    let _ = write!(xml, "</w:{}>", root);
    xml
}

pub fn header(model: &LayoutModel, watermark: Option<&str>) -> String {
    pinned_part("hdr", Placement::Header, model, model.header(), |xml| {
        if let Some(text) = watermark {
            watermark_shape(xml, text);
        }
    })
}

pub fn footer(model: &LayoutModel, page_number_format: Option<&str>) -> String {
    pinned_part("ftr", Placement::Footer, model, model.footer(), |xml| {
        if let Some(format) = page_number_format {
            page_number_paragraph(xml, format);
        }
    })
}

/// Diagonal light-gray VML text behind the page body, anchored in the header.
fn watermark_shape(xml: &mut String, text: &str) {
    let _ = write!(
        xml,
        concat!(
            r##"<w:p><w:r><w:pict>"##,
            r##"<v:shapetype id="_x0000_t136" coordsize="21600,21600" o:spt="136" adj="10800" path="m@7,l@8,m@5,21600l@6,21600e">"##,
            r##"<v:path textpathok="t" o:connecttype="custom"/><v:textpath on="t" fitshape="t"/><o:lock v:ext="edit" text="t" shapetype="t"/>"##,
            r##"</v:shapetype>"##,
            r##"<v:shape id="QuireWatermark" type="#_x0000_t136" "##,
            r##"style="position:absolute;margin-left:0;margin-top:0;width:468pt;height:117pt;rotation:315;z-index:-251657216;"##,
            r##"mso-position-horizontal:center;mso-position-horizontal-relative:margin;mso-position-vertical:center;mso-position-vertical-relative:margin" "##,
            r##"o:allowincell="f" fillcolor="#d9d9d9" stroked="f">"##,
            r##"<v:fill opacity=".5"/><v:textpath style="font-family:&quot;Helvetica&quot;;font-size:1pt" string="{}"/>"##,
            r##"</v:shape></w:pict></w:r></w:p>"##
        ),
        escape(text)
    );
}

pub fn styles(base_font_size: f32) -> String {
    let half_points = |pt: f32| (pt * 2.0).round() as u32;
    let mut xml = String::from(XML_DECL);
    let _ = write!(xml, r#"<w:styles xmlns:w="{}">"#, NS_W);
    let _ = write!(
        xml,
        r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Helvetica" w:hAnsi="Helvetica" w:cs="Helvetica"/><w:sz w:val="{0}"/><w:szCs w:val="{0}"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="100" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
        half_points(base_font_size)
    );
    xml.push_str(r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#);
    for (level, scale) in [(1, 1.6), (2, 1.3), (3, 1.15)] {
        let _ = write!(
            xml,
            r#"<w:style w:type="paragraph" w:styleId="Heading{0}"><w:name w:val="heading {0}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="120" w:after="60"/><w:outlineLvl w:val="{1}"/></w:pPr><w:rPr><w:b/><w:sz w:val="{2}"/><w:szCs w:val="{2}"/></w:rPr></w:style>"#,
            level,
            level - 1,
            half_points(base_font_size * scale)
        );
    }
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:tabs><w:tab w:val="left" w:pos="360"/></w:tabs><w:spacing w:after="40"/><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>"#);
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="Header"><w:name w:val="header"/><w:basedOn w:val="Normal"/></w:style>"#);
    xml.push_str(r#"<w:style w:type="paragraph" w:styleId="Footer"><w:name w:val="footer"/><w:basedOn w:val="Normal"/></w:style>"#);
    xml.push_str(r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblCellMar><w:left w:w="60" w:type="dxa"/><w:right w:w="60" w:type="dxa"/></w:tblCellMar></w:tblPr></w:style>"#);
    xml.push_str("</w:styles>");
    xml
}

/// Core properties without timestamps, so identical input gives an
/// identical package.
pub fn core_properties(title: Option<&str>, producer: &str) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#);
    if let Some(title) = title {
        let _ = write!(xml, "<dc:title>{}</dc:title>", escape(title));
    }
    let _ = write!(xml, "<dc:creator>{}</dc:creator>", escape(producer));
    xml.push_str("</cp:coreProperties>");
    xml
}

pub fn app_properties(producer: &str) -> String {
    let mut xml = String::from(XML_DECL);
    xml.push_str(r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#);
    let _ = write!(xml, "<Application>{}</Application>", escape(producer));
    xml.push_str("</Properties>");
    xml
}
