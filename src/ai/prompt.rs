use std::fmt::Write;

use crate::menu::{Product, RestaurantMenu};
use crate::orders::PriceCalculator;
use crate::restaurants::Restaurant;

fn push_product(out: &mut String, product: &Product) {
    let _ = write!(
        out,
        "- {}: {}",
        product.name,
        PriceCalculator::format_brl(product.price)
    );
    if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = write!(out, " ({})", description.trim());
    }
    out.push('\n');
}

/// System prompt of the WhatsApp assistant for one restaurant
///
/// Written in Portuguese; the menu is grouped by category with R$ prices.
pub fn build_system_prompt(restaurant: &Restaurant, menu: &RestaurantMenu) -> String {
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "Você é o atendente virtual do restaurante {} no WhatsApp.",
        restaurant.name
    );
    prompt.push_str(
        "Responda sempre em português do Brasil, de forma simpática, curta e objetiva.\n\n",
    );

    prompt.push_str("Informações do restaurante:\n");
    if let Some(description) = restaurant.description.as_deref() {
        let _ = writeln!(prompt, "- Sobre: {}", description);
    }
    if let Some(address) = restaurant.address.as_deref() {
        let _ = writeln!(prompt, "- Endereço: {}", address);
    }
    if let Some(phone) = restaurant.phone.as_deref() {
        let _ = writeln!(prompt, "- Telefone: {}", phone);
    }
    let _ = writeln!(
        prompt,
        "- Situação: {}",
        if restaurant.is_open {
            "aberto agora"
        } else {
            "fechado no momento"
        }
    );
    let _ = writeln!(
        prompt,
        "- Taxa de entrega: {}",
        PriceCalculator::format_brl(restaurant.delivery_fee)
    );
    if restaurant.min_order_value > rust_decimal::Decimal::ZERO {
        let _ = writeln!(
            prompt,
            "- Pedido mínimo: {}",
            PriceCalculator::format_brl(restaurant.min_order_value)
        );
    }

    prompt.push_str("\nCardápio:\n");
    if menu.is_empty() {
        prompt.push_str("Cardápio indisponível no momento.\n");
    }
    for section in menu.sections.iter().filter(|s| !s.products.is_empty()) {
        let _ = writeln!(prompt, "*{}*", section.category.name);
        for product in &section.products {
            push_product(&mut prompt, product);
        }
    }
    if !menu.uncategorized.is_empty() {
        prompt.push_str("*Outros*\n");
        for product in &menu.uncategorized {
            push_product(&mut prompt, product);
        }
    }

    prompt.push_str(
        "\nRegras:\n\
         - Ofereça apenas itens do cardápio acima, com os preços informados. Nunca invente produtos ou preços.\n\
         - Para fechar um pedido, confirme itens e quantidades, forma de pagamento (dinheiro, cartão ou Pix) e se é entrega ou retirada.\n\
         - Em pedidos para entrega, peça o endereço completo.\n\
         - Se o restaurante estiver fechado, avise o cliente e não aceite pedidos.\n\
         - Se não souber responder, peça para o cliente aguardar o atendimento humano.\n",
    );

    prompt
}
