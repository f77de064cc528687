// src/services/document_service.rs

use std::path::{Path, PathBuf};

use genpdf::{elements, style, Alignment, Element};
use image::Luma;
use qrcode::{render::svg, QrCode};

use crate::{
    common::error::AppError,
    db::{AssociateRepository, CorporationRepository},
    models::associate::Associate,
    services::scan_service::customer_url,
};

const FONT_FAMILY: &str = "Roboto";

fn qr_code(url: &str) -> Result<QrCode, AppError> {
    QrCode::new(url.as_bytes()).map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))
}

/// O QR em SVG, apontando para o formulário de Bravo do associado.
pub fn render_qr_svg(url: &str) -> Result<String, AppError> {
    Ok(qr_code(url)?
        .render::<svg::Color>()
        .min_dimensions(240, 240)
        .quiet_zone(true)
        .build())
}

// Cartão impresso: nome, função, QR e o link por extenso
fn render_tip_card(
    fonts_dir: &Path,
    associate: &Associate,
    corporation_name: Option<&str>,
    url: &str,
) -> Result<Vec<u8>, AppError> {
    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None).map_err(|_| {
        AppError::FontNotFound(format!("Fonte '{}' não encontrada em {}", FONT_FAMILY, fonts_dir.display()))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Bravos - {}", associate.name));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    let centered = |text: String, style: style::Style| {
        let mut paragraph = elements::Paragraph::new(text);
        paragraph.set_alignment(Alignment::Center);
        paragraph.styled(style)
    };

    doc.push(centered(
        corporation_name.unwrap_or("Bravos").to_string(),
        style::Style::new().bold().with_font_size(20),
    ));
    doc.push(elements::Break::new(1.5));
    doc.push(centered(associate.name.clone(), style::Style::new().bold().with_font_size(16)));
    doc.push(centered(associate.role.clone(), style::Style::new().italic().with_font_size(12)));
    doc.push(elements::Break::new(1.5));

    let image_buffer = qr_code(url)?.render::<Luma<u8>>().build();
    let qr_image = elements::Image::from_dynamic_image(image::DynamicImage::ImageLuma8(image_buffer))
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
        .with_alignment(Alignment::Center)
        .with_scale(genpdf::Scale::new(1.5, 1.5));
    doc.push(qr_image);

    doc.push(elements::Break::new(1.5));
    let call_to_action = if associate.allow_tips {
        "Scan to send a Bravo and a tip!"
    } else {
        "Scan to send a Bravo!"
    };
    doc.push(centered(call_to_action.to_string(), style::Style::new().bold().with_font_size(14)));
    doc.push(centered(url.to_string(), style::Style::new().with_font_size(8)));

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
    Ok(buffer)
}

#[derive(Clone)]
pub struct DocumentService {
    associates: AssociateRepository,
    corporations: CorporationRepository,
    public_base_url: String,
    fonts_dir: PathBuf,
}

impl DocumentService {
    pub fn new(
        associates: AssociateRepository,
        corporations: CorporationRepository,
        public_base_url: String,
        fonts_dir: PathBuf,
    ) -> Self {
        Self { associates, corporations, public_base_url, fonts_dir }
    }

    async fn associate(&self, associate_id: &str) -> Result<Associate, AppError> {
        self.associates
            .find_by_id(associate_id)
            .await?
            .ok_or_else(|| AppError::AssociateNotFound(associate_id.to_string()))
    }

    pub async fn associate_qr_svg(&self, associate_id: &str) -> Result<String, AppError> {
        let associate = self.associate(associate_id).await?;
        render_qr_svg(&customer_url(&self.public_base_url, &associate.id))
    }

    pub async fn tip_card_pdf(&self, associate_id: &str) -> Result<Vec<u8>, AppError> {
        let associate = self.associate(associate_id).await?;
        let corporation_name = match associate.corporate_id.as_deref().filter(|_| associate.is_corporate) {
            Some(corporate_id) => self.corporations.find_by_id(corporate_id).await?.map(|c| c.name),
            None => None,
        };
        let url = customer_url(&self.public_base_url, &associate.id);
        render_tip_card(&self.fonts_dir, &associate, corporation_name.as_deref(), &url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::associate::NewAssociate, test_support::memory_repositories};

    #[test]
    fn qr_svg_is_a_standalone_image() {
        let svg = render_qr_svg("https://bravos.app/#/customer/abc").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[tokio::test]
    async fn tip_card_without_fonts_reports_the_missing_font() {
        let repos = memory_repositories();
        let associate = repos
            .associates
            .create(NewAssociate::independent("a@b.com", "Ana", "Barista", "", "u"))
            .await
            .unwrap();
        let service = DocumentService::new(
            repos.associates.clone(),
            repos.corporations.clone(),
            "https://bravos.app".into(),
            PathBuf::from("./no-such-fonts-dir"),
        );

        let err = service.tip_card_pdf(&associate.id).await.unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));

        let missing = service.associate_qr_svg("ghost").await.unwrap_err();
        assert!(matches!(missing, AppError::AssociateNotFound(_)));
    }
}
