//! Vector cover renderers.
//!
//! Both renderers are pure string builders; the caller decides whether the
//! SVG lands on disk or inline as a data URI.

use super::catalog::{GENERAL_PALETTE, Palette, Theme};
use crate::utils::{hex_window, sha256_hex, take_chars};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::escape::escape;

const VARIANT_PALETTES: [Palette; 5] = [
    Palette("#0f172a", "#1d4ed8", "#38bdf8"),
    Palette("#111827", "#334155", "#14b8a6"),
    Palette("#0b132b", "#1e3a8a", "#60a5fa"),
    Palette("#1f2937", "#4f46e5", "#a78bfa"),
    Palette("#042f2e", "#0f766e", "#34d399"),
];

/// Logo box `(x, y, width, height)` per variant.
const VARIANT_LAYOUTS: [(u32, u32, u32, u32); 5] = [
    (312, 240, 400, 400),
    (272, 300, 480, 300),
    (350, 260, 324, 324),
    (280, 248, 460, 360),
    (330, 320, 360, 260),
];

const VARIANT_OVERLAYS: [&str; 5] = [
    r#"<rect x="710" y="80" width="240" height="240" rx="120" fill="rgba(255,255,255,0.15)" />"#,
    r#"<circle cx="860" cy="170" r="140" fill="rgba(255,255,255,0.14)" />"#,
    r#"<rect x="70" y="90" width="300" height="180" rx="28" fill="rgba(255,255,255,0.15)" />"#,
    r#"<path d="M110 820 C340 640, 620 900, 920 700" fill="none" stroke="rgba(255,255,255,0.26)" stroke-width="12" />"#,
    r#"<circle cx="180" cy="840" r="170" fill="rgba(255,255,255,0.12)" />"#,
];

/// Brand cover number `variant` (1-based) compositing `logo_href` over a
/// rotating palette, logo layout, and overlay.
///
/// An empty `logo_href` renders the label in a plate instead of an image.
pub fn brand_variant_svg(theme: &Theme, logo_href: &str, variant: usize) -> String {
    let variant = variant.max(1);
    let label = take_chars(&theme.label.to_uppercase(), 18);
    let label = escape(label.as_str());
    let subtitle = take_chars(&theme.subtitle, 24);
    let subtitle = escape(subtitle.as_str());

    let Palette(p1, p2, p3) = VARIANT_PALETTES[(variant - 1) % VARIANT_PALETTES.len()];
    let (lx, ly, lw, lh) = VARIANT_LAYOUTS[(variant - 1) % VARIANT_LAYOUTS.len()];
    let overlay = VARIANT_OVERLAYS[variant % VARIANT_OVERLAYS.len()];

    let logo_layer = if logo_href.is_empty() {
        format!(
            r#"<rect x="{lx}" y="{ly}" width="{lw}" height="{lh}" rx="28" fill="rgba(255,255,255,0.18)" /><text x="{tx}" y="{ty}" fill="white" font-size="54" font-family="Arial, sans-serif" font-weight="800">{label}</text>"#,
            tx = lx + 40,
            ty = ly + lh / 2,
        )
    } else {
        format!(
            r#"<image href="{href}" x="{lx}" y="{ly}" width="{lw}" height="{lh}" preserveAspectRatio="xMidYMid meet" />"#,
            href = escape(logo_href),
        )
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1024" height="1024" viewBox="0 0 1024 1024">
  <defs>
    <linearGradient id="cbg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="{p1}" />
      <stop offset="60%" stop-color="{p2}" />
      <stop offset="100%" stop-color="{p3}" />
    </linearGradient>
  </defs>
  <rect width="1024" height="1024" fill="url(#cbg)" />
  {overlay}
  <rect x="76" y="74" width="320" height="54" rx="27" fill="rgba(255,255,255,0.2)" />
  <text x="102" y="110" fill="white" font-size="30" font-family="Arial, sans-serif" font-weight="700">{label}</text>
  <text x="80" y="920" fill="#e2e8f0" font-size="34" font-family="Arial, sans-serif">{subtitle}</text>
  <rect x="{fx}" y="{fy}" width="{fw}" height="{fh}" rx="34" fill="rgba(255,255,255,0.16)" />
  {logo_layer}
</svg>
"##,
        fx = lx - 24,
        fy = ly - 24,
        fw = lw + 48,
        fh = lh + 48,
    )
}

/// Abstract editorial illustration in the topic palette.
///
/// `seed` (normally `"<theme>|<title>"`) picks one of two palette rotations
/// so neighbouring items in the same topic do not look identical.
pub fn illustration_svg(palette: Option<Palette>, seed: &str) -> String {
    let base = palette.unwrap_or(GENERAL_PALETTE);
    let digest = sha256_hex(seed.as_bytes());
    let Palette(p1, p2, p3) = if hex_window(&digest, 62, 64) % 2 == 0 {
        base
    } else {
        base.rotated()
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1024" height="1024" viewBox="0 0 1024 1024">
  <defs>
    <linearGradient id="bg" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="{p1}" />
      <stop offset="60%" stop-color="{p2}" />
      <stop offset="100%" stop-color="{p3}" />
    </linearGradient>
    <radialGradient id="glow" cx="0.8" cy="0.2" r="0.7">
      <stop offset="0%" stop-color="rgba(255,255,255,0.25)" />
      <stop offset="100%" stop-color="rgba(255,255,255,0)" />
    </radialGradient>
  </defs>
  <rect width="1024" height="1024" fill="url(#bg)" />
  <rect width="1024" height="1024" fill="url(#glow)" />
  <g opacity="0.17" stroke="white" stroke-width="2" fill="none">
    <circle cx="210" cy="180" r="120" />
    <circle cx="860" cy="760" r="180" />
    <path d="M120 800 C360 640, 620 900, 910 700" />
  </g>
  <g opacity="0.28" fill="none" stroke="#ffffff" stroke-width="8">
    <rect x="300" y="260" width="420" height="300" rx="36" />
    <circle cx="510" cy="410" r="76" />
    <path d="M342 520 L460 430 L545 500 L678 360" />
  </g>
</svg>
"##
    )
}

/// Inline `data:` URI for raw bytes.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
