//! PPTX deck writer: one full-bleed picture per slide.
//!
//! A `.pptx` is an OPC package — a zip archive of XML parts tied together by
//! relationship files. The deck written here is the smallest package
//! PowerPoint, Keynote and LibreOffice all open without repair prompts:
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/{core,app}.xml
//! ppt/presentation.xml                 slide list + slide size
//! ppt/_rels/presentation.xml.rels
//! ppt/{presProps,viewProps,tableStyles}.xml
//! ppt/slideMasters/slideMaster1.xml    (+ _rels)
//! ppt/slideLayouts/slideLayout1.xml    blank layout (+ _rels)
//! ppt/theme/theme1.xml
//! ppt/slides/slideN.xml                (+ _rels → layout, image)
//! ppt/media/imageN.{jpeg,png}
//! ```
//!
//! Slide size is fixed from the first image at one point per pixel. Every
//! picture is placed at the origin with an extent equal to the slide size
//! and `<a:stretch><a:fillRect/>`, so images with a different aspect ratio
//! than the first page are stretched, not letterboxed.

use crate::config::ImageFormat;
use crate::error::StageError;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// English Metric Units per point.
pub const EMU_PER_POINT: i64 = 12_700;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_PKG_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
const REL_SLIDE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
const REL_THEME: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const REL_PRES_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
const REL_VIEW_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
const REL_TABLE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// First slide id PowerPoint accepts in `sldIdLst`.
const FIRST_SLIDE_ID: usize = 256;

/// Picture placed on one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideImage {
    pub path: PathBuf,
    pub format: ImageFormat,
}

/// An in-memory description of the deck; image bytes are streamed from disk
/// on [`Deck::save`].
#[derive(Debug, Clone)]
pub struct Deck {
    slide_width: i64,
    slide_height: i64,
    title: Option<String>,
    slides: Vec<SlideImage>,
}

impl Deck {
    /// Create an empty deck whose slides measure `width_px` × `height_px`
    /// points.
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            slide_width: i64::from(width_px) * EMU_PER_POINT,
            slide_height: i64::from(height_px) * EMU_PER_POINT,
            title: None,
            slides: Vec::new(),
        }
    }

    /// Set the document title written to `docProps/core.xml`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Append a slide showing `path`, stretched over the whole slide.
    pub fn add_picture_slide(&mut self, path: impl Into<PathBuf>, format: ImageFormat) {
        self.slides.push(SlideImage {
            path: path.into(),
            format,
        });
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide size in EMU as `(cx, cy)`.
    pub fn slide_size_emu(&self) -> (i64, i64) {
        (self.slide_width, self.slide_height)
    }

    /// Write the package to `path` atomically and return its size in bytes.
    ///
    /// The archive is written to `<path>.tmp` and renamed into place, so a
    /// failure never leaves a truncated deck behind. `on_slide(done, total)`
    /// fires after each slide's parts are in the archive.
    pub fn save(
        &self,
        path: &Path,
        mut on_slide: impl FnMut(usize, usize),
    ) -> Result<u64, StageError> {
        if self.slides.is_empty() {
            return Err(StageError::NoImages);
        }

        let tmp_path = tmp_path_for(path);
        let result = self
            .write_archive(&tmp_path, &mut on_slide)
            .and_then(|()| {
                fs::rename(&tmp_path, path).map_err(|e| {
                    StageError::io(format!("Failed to move deck into '{}'", path.display()), e)
                })
            });
        if let Err(e) = result {
            if tmp_path.exists() {
                if let Err(rm) = fs::remove_file(&tmp_path) {
                    warn!("Failed to remove partial deck {}: {}", tmp_path.display(), rm);
                }
            }
            return Err(e);
        }

        let bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        info!(
            "Wrote deck {} ({} slides, {} bytes)",
            path.display(),
            self.slides.len(),
            bytes
        );
        Ok(bytes)
    }

    fn write_archive(
        &self,
        tmp_path: &Path,
        on_slide: &mut impl FnMut(usize, usize),
    ) -> Result<(), StageError> {
        let zip_err = |source: zip::result::ZipError| StageError::DeckWrite {
            path: tmp_path.to_path_buf(),
            source,
        };
        let io_err = |e: io::Error| {
            StageError::io(format!("Failed to write deck '{}'", tmp_path.display()), e)
        };

        let file = File::create(tmp_path).map_err(io_err)?;
        let mut zip = ZipWriter::new(file);
        let xml_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let media_opts = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let put = |zip: &mut ZipWriter<File>, name: &str, body: &str| -> Result<(), StageError> {
            zip.start_file(name, xml_opts).map_err(zip_err)?;
            zip.write_all(body.as_bytes()).map_err(io_err)?;
            debug!("Deck part {} ({} bytes)", name, body.len());
            Ok(())
        };

        put(&mut zip, "[Content_Types].xml", &self.content_types_xml())?;
        put(&mut zip, "_rels/.rels", &root_rels_xml())?;
        put(&mut zip, "docProps/core.xml", &self.core_props_xml())?;
        put(&mut zip, "docProps/app.xml", &self.app_props_xml())?;
        put(&mut zip, "ppt/presentation.xml", &self.presentation_xml())?;
        put(
            &mut zip,
            "ppt/_rels/presentation.xml.rels",
            &self.presentation_rels_xml(),
        )?;
        put(&mut zip, "ppt/presProps.xml", &pres_props_xml())?;
        put(&mut zip, "ppt/viewProps.xml", &view_props_xml())?;
        put(&mut zip, "ppt/tableStyles.xml", &table_styles_xml())?;
        put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master_xml())?;
        put(
            &mut zip,
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            &slide_master_rels_xml(),
        )?;
        put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout_xml())?;
        put(
            &mut zip,
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            &slide_layout_rels_xml(),
        )?;
        put(&mut zip, "ppt/theme/theme1.xml", &theme_xml())?;

        let total = self.slides.len();
        for (index, slide) in self.slides.iter().enumerate() {
            let n = index + 1;
            put(&mut zip, &format!("ppt/slides/slide{n}.xml"), &self.slide_xml(index))?;
            put(
                &mut zip,
                &format!("ppt/slides/_rels/slide{n}.xml.rels"),
                &slide_rels_xml(n, slide.format),
            )?;

            zip.start_file(media_part_name(n, slide.format), media_opts)
                .map_err(zip_err)?;
            let mut image = File::open(&slide.path).map_err(|e| {
                StageError::io(format!("Failed to read '{}'", slide.path.display()), e)
            })?;
            io::copy(&mut image, &mut zip).map_err(io_err)?;

            on_slide(n, total);
        }

        let mut file = zip.finish().map_err(zip_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }

    // ── Part generators ──────────────────────────────────────────────────

    /// `ppt/presentation.xml`: master list, slide list and slide size.
    pub fn presentation_xml(&self) -> String {
        let mut xml = String::with_capacity(1024 + self.slides.len() * 48);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(
            r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
        ));
        xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);

        xml.push_str("<p:sldIdLst>");
        for index in 0..self.slides.len() {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                FIRST_SLIDE_ID + index,
                slide_rel_id(index)
            ));
        }
        xml.push_str("</p:sldIdLst>");

        xml.push_str(&format!(
            r#"<p:sldSz cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        ));
        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str("</p:presentation>");
        xml
    }

    /// `ppt/_rels/presentation.xml.rels`.
    ///
    /// `rId1` is the master, slides follow from `rId2`, and the theme and
    /// property parts come after the last slide.
    pub fn presentation_rels_xml(&self) -> String {
        let mut rels = Relationships::new();
        rels.push("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
        for index in 0..self.slides.len() {
            rels.push(
                &slide_rel_id(index),
                REL_SLIDE,
                &format!("slides/slide{}.xml", index + 1),
            );
        }
        let next = self.slides.len() + 2;
        rels.push(&format!("rId{next}"), REL_THEME, "theme/theme1.xml");
        rels.push(&format!("rId{}", next + 1), REL_PRES_PROPS, "presProps.xml");
        rels.push(&format!("rId{}", next + 2), REL_VIEW_PROPS, "viewProps.xml");
        rels.push(&format!("rId{}", next + 3), REL_TABLE_STYLES, "tableStyles.xml");
        rels.finish()
    }

    /// `ppt/slides/slideN.xml` for the slide at `index` (0-based).
    pub fn slide_xml(&self, index: usize) -> String {
        let descr = self
            .slides
            .get(index)
            .and_then(|s| s.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut xml = String::with_capacity(1024);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(GROUP_SHAPE_PROPS);

        xml.push_str("<p:pic>");
        xml.push_str("<p:nvPicPr>");
        xml.push_str(&format!(
            r#"<p:cNvPr id="2" name="Picture {}" descr="{}"/>"#,
            index + 1,
            escape_xml(&descr)
        ));
        xml.push_str("<p:cNvPicPr/><p:nvPr/>");
        xml.push_str("</p:nvPicPr>");

        xml.push_str("<p:blipFill>");
        xml.push_str(r#"<a:blip r:embed="rId2"/>"#);
        xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
        xml.push_str("</p:blipFill>");

        xml.push_str("<p:spPr><a:xfrm>");
        xml.push_str(r#"<a:off x="0" y="0"/>"#);
        xml.push_str(&format!(
            r#"<a:ext cx="{}" cy="{}"/>"#,
            self.slide_width, self.slide_height
        ));
        xml.push_str("</a:xfrm>");
        xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
        xml.push_str("</p:spPr>");
        xml.push_str("</p:pic>");

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }

    /// `[Content_Types].xml`, with a default entry per media type in use.
    pub fn content_types_xml(&self) -> String {
        let mut formats: Vec<ImageFormat> = Vec::new();
        for slide in &self.slides {
            if !formats.contains(&slide.format) {
                formats.push(slide.format);
            }
        }

        let mut xml = String::with_capacity(2048 + self.slides.len() * 160);
        xml.push_str(XML_DECL);
        xml.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        for format in formats {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.media_extension(),
                format.content_type()
            ));
        }

        let overrides = [
            ("/ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
            ("/ppt/slideMasters/slideMaster1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
            ("/ppt/slideLayouts/slideLayout1.xml", "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
            ("/ppt/theme/theme1.xml", "application/vnd.openxmlformats-officedocument.theme+xml"),
            ("/ppt/presProps.xml", "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml"),
            ("/ppt/viewProps.xml", "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml"),
            ("/ppt/tableStyles.xml", "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml"),
            ("/docProps/core.xml", "application/vnd.openxmlformats-package.core-properties+xml"),
            ("/docProps/app.xml", "application/vnd.openxmlformats-officedocument.extended-properties+xml"),
        ];
        for (part, content_type) in overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
            ));
        }
        for n in 1..=self.slides.len() {
            xml.push_str(&format!(
                r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
            ));
        }

        xml.push_str("</Types>");
        xml
    }

    fn core_props_xml(&self) -> String {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECL);
        xml.push_str(concat!(
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
        ));
        if let Some(ref title) = self.title {
            xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
        }
        xml.push_str("<dc:creator>pdf2pptx</dc:creator>");
        xml.push_str("</cp:coreProperties>");
        xml
    }

    fn app_props_xml(&self) -> String {
        format!(
            concat!(
                "{}",
                r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
                "<Application>pdf2pptx</Application><Slides>{}</Slides>",
                "</Properties>"
            ),
            XML_DECL,
            self.slides.len()
        )
    }
}

// ── Static parts ─────────────────────────────────────────────────────────

/// Required group-shape header of every `spTree`.
const GROUP_SHAPE_PROPS: &str = concat!(
    r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
    r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
    r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
);

fn root_rels_xml() -> String {
    let mut rels = Relationships::new();
    rels.push("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    rels.push("rId2", REL_CORE_PROPS, "docProps/core.xml");
    rels.push("rId3", REL_APP_PROPS, "docProps/app.xml");
    rels.finish()
}

fn slide_rels_xml(n: usize, format: ImageFormat) -> String {
    let mut rels = Relationships::new();
    rels.push("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    rels.push(
        "rId2",
        REL_IMAGE,
        &format!("../media/image{n}.{}", format.media_extension()),
    );
    rels.finish()
}

fn slide_master_rels_xml() -> String {
    let mut rels = Relationships::new();
    rels.push("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");
    rels.push("rId2", REL_THEME, "../theme/theme1.xml");
    rels.finish()
}

fn slide_layout_rels_xml() -> String {
    let mut rels = Relationships::new();
    rels.push("rId1", REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
    rels.finish()
}

fn slide_master_xml() -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
    ));
    xml.push_str("<p:cSld>");
    xml.push_str(r#"<p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str("<p:spTree>");
    xml.push_str(GROUP_SHAPE_PROPS);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
        r#"hlink="hlink" folHlink="folHlink"/>"#
    ));
    xml.push_str(r#"<p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst>"#);
    xml.push_str("<p:txStyles><p:titleStyle/><p:bodyStyle/><p:otherStyle/></p:txStyles>");
    xml.push_str("</p:sldMaster>");
    xml
}

fn slide_layout_xml() -> String {
    let mut xml = String::with_capacity(768);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1">"#
    ));
    xml.push_str(r#"<p:cSld name="Blank"><p:spTree>"#);
    xml.push_str(GROUP_SHAPE_PROPS);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sldLayout>");
    xml
}

fn pres_props_xml() -> String {
    format!(r#"{XML_DECL}<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#)
}

fn view_props_xml() -> String {
    format!(
        r#"{XML_DECL}<p:viewPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#
    )
}

fn table_styles_xml() -> String {
    format!(
        r#"{XML_DECL}<a:tblStyleLst xmlns:a="{NS_A}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
    )
}

/// Office theme reduced to the mandatory colour, font and format schemes.
fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{NS_A}" name="Office Theme">"#));
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (name, rgb) in [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        xml.push_str(&format!(r#"<a:{name}><a:srgbClr val="{rgb}"/></a:{name}>"#));
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(r#"<a:fontScheme name="Office">"#);
    for group in ["majorFont", "minorFont"] {
        let face = if group == "majorFont" { "Calibri Light" } else { "Calibri" };
        xml.push_str(&format!(
            r#"<a:{group}><a:latin typeface="{face}"/><a:ea typeface=""/><a:cs typeface=""/></a:{group}>"#
        ));
    }
    xml.push_str("</a:fontScheme>");

    xml.push_str(r#"<a:fmtScheme name="Office">"#);
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str("<a:fillStyleLst>");
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:fillStyleLst>");
    xml.push_str("<a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        xml.push_str(&format!(
            r#"<a:ln w="{width}" cap="flat" cmpd="sng" algn="ctr">{solid}<a:prstDash val="solid"/><a:miter lim="800000"/></a:ln>"#
        ));
    }
    xml.push_str("</a:lnStyleLst>");
    xml.push_str("<a:effectStyleLst>");
    for _ in 0..3 {
        xml.push_str("<a:effectStyle><a:effectLst/></a:effectStyle>");
    }
    xml.push_str("</a:effectStyleLst>");
    xml.push_str("<a:bgFillStyleLst>");
    for _ in 0..3 {
        xml.push_str(solid);
    }
    xml.push_str("</a:bgFillStyleLst>");
    xml.push_str("</a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    xml
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Builder for a `.rels` part.
struct Relationships {
    xml: String,
}

impl Relationships {
    fn new() -> Self {
        let mut xml = String::with_capacity(512);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<Relationships xmlns="{NS_PKG_RELS}">"#));
        Self { xml }
    }

    fn push(&mut self, id: &str, rel_type: &str, target: &str) {
        self.xml.push_str(&format!(
            r#"<Relationship Id="{id}" Type="{rel_type}" Target="{}"/>"#,
            escape_xml(target)
        ));
    }

    fn finish(mut self) -> String {
        self.xml.push_str("</Relationships>");
        self.xml
    }
}

/// Relationship id of the slide at `index` inside `presentation.xml.rels`.
fn slide_rel_id(index: usize) -> String {
    format!("rId{}", index + 2)
}

fn media_part_name(n: usize, format: ImageFormat) -> String {
    format!("ppt/media/image{n}.{}", format.media_extension())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Escape the five XML special characters for text and attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn write_jpeg(dir: &Path, name: &str, w: u32, h: u32, shade: u8) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([shade, shade, shade])))
            .save(&path)
            .unwrap();
        path
    }

    fn read_part(archive: &mut ZipArchive<File>, name: &str) -> String {
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn escape_handles_specials() {
        assert_eq!(escape_xml(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn slide_size_is_one_point_per_pixel() {
        let deck = Deck::new(1000, 750);
        assert_eq!(deck.slide_size_emu(), (12_700_000, 9_525_000));
        let xml = deck.presentation_xml();
        assert!(xml.contains(r#"<p:sldSz cx="12700000" cy="9525000"/>"#));
    }

    #[test]
    fn picture_covers_whole_slide() {
        let mut deck = Deck::new(400, 300);
        deck.add_picture_slide("page_001.jpg", ImageFormat::Jpeg);
        let xml = deck.slide_xml(0);
        assert!(xml.contains(r#"<a:off x="0" y="0"/><a:ext cx="5080000" cy="3810000"/>"#));
        assert!(xml.contains("<a:stretch><a:fillRect/></a:stretch>"));
        assert!(xml.contains(r#"descr="page_001.jpg""#));
    }

    #[test]
    fn presentation_lists_slides_in_order() {
        let mut deck = Deck::new(10, 10);
        for i in 1..=3 {
            deck.add_picture_slide(format!("page_00{i}.png"), ImageFormat::Png);
        }
        let xml = deck.presentation_xml();
        let a = xml.find(r#"id="256" r:id="rId2""#).unwrap();
        let b = xml.find(r#"id="257" r:id="rId3""#).unwrap();
        let c = xml.find(r#"id="258" r:id="rId4""#).unwrap();
        assert!(a < b && b < c);

        let rels = deck.presentation_rels_xml();
        assert!(rels.contains(r#"Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide3.xml""#));
        assert!(rels.contains(r#"Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme""#));

        let types = deck.content_types_xml();
        assert!(types.contains(r#"Extension="png""#));
        assert!(!types.contains(r#"Extension="jpeg""#));
        assert!(types.contains("/ppt/slides/slide3.xml"));
    }

    #[test]
    fn empty_deck_is_rejected() {
        let dir = TempDir::new().unwrap();
        let deck = Deck::new(10, 10);
        let err = deck.save(&dir.path().join("x.pptx"), |_, _| {}).unwrap_err();
        assert!(matches!(err, StageError::NoImages));
        assert!(!dir.path().join("x.pptx").exists());
    }

    #[test]
    fn saved_archive_has_all_parts_in_order() {
        let dir = TempDir::new().unwrap();
        let first = write_jpeg(dir.path(), "page_001.jpg", 40, 30, 10);
        let second = write_jpeg(dir.path(), "page_002.jpg", 30, 40, 200);

        let mut deck = Deck::new(40, 30).with_title("Q3 <Review>");
        deck.add_picture_slide(&first, ImageFormat::Jpeg);
        deck.add_picture_slide(&second, ImageFormat::Jpeg);

        let out = dir.path().join("review.pptx");
        let mut seen = Vec::new();
        let bytes = deck.save(&out, |done, total| seen.push((done, total))).unwrap();
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
        assert!(bytes > 0);
        assert!(!dir.path().join("review.pptx.tmp").exists());

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }

        let mut media = Vec::new();
        archive
            .by_name("ppt/media/image2.jpeg")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, fs::read(&second).unwrap());

        let core = read_part(&mut archive, "docProps/core.xml");
        assert!(core.contains("Q3 &lt;Review&gt;"));

        let slide2 = read_part(&mut archive, "ppt/slides/slide2.xml");
        assert!(slide2.contains(r#"<a:ext cx="508000" cy="381000"/>"#));
    }

    #[test]
    fn missing_image_fails_without_leaving_files() {
        let dir = TempDir::new().unwrap();
        let mut deck = Deck::new(10, 10);
        deck.add_picture_slide(dir.path().join("gone.jpg"), ImageFormat::Jpeg);
        let out = dir.path().join("broken.pptx");
        let err = deck.save(&out, |_, _| {}).unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
        assert!(!out.exists());
        assert!(!dir.path().join("broken.pptx.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_partial_deck() {
        let dir = TempDir::new().unwrap();
        let image = write_jpeg(dir.path(), "page_001.jpg", 20, 20, 90);
        let mut deck = Deck::new(20, 20);
        deck.add_picture_slide(&image, ImageFormat::Jpeg);

        // A non-empty directory squats on the deck path.
        let out = dir.path().join("taken.pptx");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep.txt"), b"x").unwrap();

        let err = deck.save(&out, |_, _| {}).unwrap_err();
        assert!(matches!(err, StageError::Io { .. }));
        assert!(out.join("keep.txt").is_file());
        assert!(!dir.path().join("taken.pptx.tmp").exists());
    }
}
