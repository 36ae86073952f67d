//! 单页文本 PDF 生成 (Helvetica, WinAnsiEncoding)

const PAGE_WIDTH: u32 = 612; // US Letter
const PAGE_HEIGHT: u32 = 792;
const MARGIN: f64 = 36.0;
const MAX_FONT_SIZE: f64 = 10.0;
const MIN_FONT_SIZE: f64 = 4.0;
const LINE_SPACING: f64 = 1.2;

/// 将字符转为 WinAnsi 字节, 无法表示的字符用 '?'
fn encode_char(c: char) -> u8 {
    match c {
        '€' => 0x80,
        '\t' => b' ',
        c if (c as u32) >= 0x20 && (c as u32) < 0x7F => c as u8,
        c if (c as u32) >= 0xA0 && (c as u32) <= 0xFF => c as u32 as u8,
        _ => b'?',
    }
}

/// PDF 字符串字面量 "(...)"
fn encode_line(line: &str, out: &mut Vec<u8>) {
    out.push(b'(');
    for c in line.chars() {
        let byte = encode_char(c);
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
}

/// 字号随行数缩小, 保证全部内容在一页内
fn font_size_for(lines: usize) -> f64 {
    let usable = PAGE_HEIGHT as f64 - 2.0 * MARGIN;
    let fitted = usable / (lines.max(1) as f64 * LINE_SPACING);
    fitted.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

fn content_stream(text: &str) -> Vec<u8> {
    let lines: Vec<&str> = text.lines().collect();
    let font_size = font_size_for(lines.len());
    let leading = font_size * LINE_SPACING;
    let top = PAGE_HEIGHT as f64 - MARGIN - font_size;

    let mut out = Vec::new();
    out.extend_from_slice(
        format!(
            "BT\n/F1 {:.2} Tf\n{:.2} TL\n{:.2} {:.2} Td\n",
            font_size, leading, MARGIN, top
        )
        .as_bytes(),
    );
    for line in lines {
        encode_line(line.trim_end(), &mut out);
        out.extend_from_slice(b" Tj T*\n");
    }
    out.extend_from_slice(b"ET");
    out
}

/// 生成单页 PDF 1.4
pub fn render_text_pdf(text: &str) -> Vec<u8> {
    let stream = content_stream(text);

    let objects: Vec<Vec<u8>> = vec![
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        {
            let mut obj = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
            obj.extend_from_slice(&stream);
            obj.extend_from_slice(b"\nendstream");
            obj
        },
    ];

    let mut pdf: Vec<u8> = Vec::new();
    pdf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let mut offsets = Vec::with_capacity(objects.len());
    for (idx, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n", idx + 1).as_bytes());
        pdf.extend_from_slice(body);
        pdf.extend_from_slice(b"\nendobj\n");
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    pdf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn document_structure_is_consistent() {
        let pdf = render_text_pdf("FATURA FT A/12\nTotal: 12,50 €\n");

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));

        let tail = String::from_utf8_lossy(&pdf[pdf.len() - 40..]).to_string();
        let startxref: usize = tail
            .split("startxref\n")
            .nth(1)
            .and_then(|s| s.lines().next())
            .and_then(|s| s.trim().parse().ok())
            .unwrap();
        assert_eq!(&pdf[startxref..startxref + 4], b"xref");
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = render_text_pdf("linha 1\nlinha 2");
        let xref = find(&pdf, b"xref\n").unwrap();
        let table = String::from_utf8_lossy(&pdf[xref..]).to_string();

        for (n, line) in table.lines().skip(3).take(5).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let header = format!("{} 0 obj", n + 1);
            assert_eq!(&pdf[offset..offset + header.len()], header.as_bytes());
        }
    }

    #[test]
    fn stream_length_matches_content() {
        let text = "Café (x2) \\ pão";
        let pdf = render_text_pdf(text);
        let stream = content_stream(text);

        let declared = format!("<< /Length {} >>", stream.len());
        assert!(find(&pdf, declared.as_bytes()).is_some());
    }

    #[test]
    fn special_characters_are_escaped_and_encoded() {
        let mut out = Vec::new();
        encode_line("(ç) \\ €✓", &mut out);

        assert_eq!(out, b"(\\(\xE7\\) \\\\ \x80?)".to_vec());
    }

    #[test]
    fn long_text_shrinks_font_but_stays_in_bounds() {
        assert_eq!(font_size_for(10), MAX_FONT_SIZE);
        assert!(font_size_for(100) < MAX_FONT_SIZE);
        assert_eq!(font_size_for(10_000), MIN_FONT_SIZE);
    }
}
