//! The SVG visit badge.

/// Render the `total / today` badge: a 150x30 rounded rectangle with a
/// light gray gradient and centered counts.
pub fn badge(total_hits: u64, today_hits: u64) -> String {
  format!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="150" height="30">
  <defs>
    <linearGradient id="grad" x1="0%" y1="0%" x2="100%" y2="0%">
      <stop offset="0%" style="stop-color:#f0f0f0;stop-opacity:1" />
      <stop offset="100%" style="stop-color:#e6e6e6;stop-opacity:1" />
    </linearGradient>
  </defs>
  <rect width="150" height="30" rx="5" fill="url(#grad)" stroke="#d0d0d0" stroke-width="1"/>
  <text x="75" y="20" font-family="Arial, sans-serif" font-size="14" fill="#333" text-anchor="middle">{total_hits} / {today_hits}</text>
</svg>"##
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn badge_shows_total_then_today() {
    let svg = badge(1234, 56);
    assert!(svg.contains(">1234 / 56<"), "{svg}");
  }

  #[test]
  fn badge_has_fixed_dimensions() {
    let svg = badge(0, 0);
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains(r#"width="150" height="30""#));
  }
}
